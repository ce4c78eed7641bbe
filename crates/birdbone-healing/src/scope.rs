use birdbone_core::models::{HealingScope, HealingScopeMode, UnitSet, Wave};

/// Units a healing step may update for `wave`. Call after the wave is
/// applied so its own units are already excluded.
pub fn resolve_scope(units: &UnitSet, wave: &Wave, mode: HealingScopeMode) -> HealingScope {
    let layers = units.layers_of(&wave.unit_ids);
    let unit_ids = match mode {
        HealingScopeMode::WaveLayers => units.active_in_layers(&layers),
        HealingScopeMode::WholeModel => units.active().map(|u| u.id).collect(),
    };
    HealingScope {
        mode,
        layers: layers.into_iter().collect(),
        unit_ids,
    }
}
