use crate::errors::BirdboneResult;
use crate::models::{GuardrailState, ImportanceRecord, ReversibleDelta, Wave, WaveOutcome};

/// Everything needed to resume an interrupted run.
#[derive(Debug, Clone, Default)]
pub struct JournalSnapshot {
    /// Outcomes in cycle order.
    pub outcomes: Vec<WaveOutcome>,
    /// Guardrail state after the most recent logged cycle.
    pub guardrail: Option<GuardrailState>,
    /// Most recent importance record.
    pub last_record: Option<ImportanceRecord>,
}

impl JournalSnapshot {
    /// Index the next cycle should use.
    pub fn next_cycle(&self) -> u64 {
        self.outcomes.last().map(|o| o.cycle + 1).unwrap_or(0)
    }
}

/// Everything one finished cycle writes to the journal.
#[derive(Debug, Clone, Copy)]
pub struct CycleEntry<'a> {
    pub cycle: u64,
    /// The applied wave; `None` for terminal outcomes.
    pub wave: Option<&'a Wave>,
    pub outcome: &'a WaveOutcome,
    /// Guardrail after resolution; `None` when no wave was resolved.
    pub guardrail: Option<&'a GuardrailState>,
    pub delta: Option<&'a ReversibleDelta>,
}

/// Append-only log of cycle history keyed by cycle index.
pub trait CycleJournal: Send {
    fn append_record(&mut self, record: &ImportanceRecord) -> BirdboneResult<()>;

    fn append_outcome(&mut self, wave: Option<&Wave>, outcome: &WaveOutcome) -> BirdboneResult<()>;

    fn append_guardrail(&mut self, cycle: u64, state: &GuardrailState) -> BirdboneResult<()>;

    /// Keep a committed wave's delta for audit.
    fn append_delta(&mut self, cycle: u64, delta: &ReversibleDelta) -> BirdboneResult<()>;

    /// Write one finished cycle. The outcome row goes last, so a logged
    /// outcome implies the rest of its cycle is logged too. Database-backed
    /// journals override this to write all-or-nothing.
    fn append_cycle(&mut self, entry: &CycleEntry<'_>) -> BirdboneResult<()> {
        if let Some(state) = entry.guardrail {
            self.append_guardrail(entry.cycle, state)?;
        }
        if let Some(delta) = entry.delta {
            self.append_delta(entry.cycle, delta)?;
        }
        self.append_outcome(entry.wave, entry.outcome)
    }

    fn load(&self) -> BirdboneResult<JournalSnapshot>;
}
