/// Filter value that shows every material.
pub const ALL_MATERIALS: &str = "Todos";
pub const CHARCOAL: &str = "Carvão Vegetal";
pub const IRON_ORE: &str = "Minério de Ferro";

pub fn is_all_materials(filter: &str) -> bool {
    filter == ALL_MATERIALS
}
