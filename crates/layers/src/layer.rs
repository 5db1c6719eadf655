/// Handle of a layer attached to a map surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// National state outlines; clicking one selects the state.
    States,
    /// Municipalities of the selected state, colored by supplier presence.
    Cities,
    /// One property shapefile record, shown only over satellite imagery.
    Shapefile,
}
