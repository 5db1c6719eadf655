/// What the map shows under the municipality layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum BasemapMode {
    /// Colored municipality polygons.
    #[default]
    Vector,
    /// Satellite tiles with property overlays; municipality fills hidden.
    Satellite,
}

impl BasemapMode {
    pub fn for_zoom(zoom: f64, satellite_zoom: f64) -> Self {
        if zoom > satellite_zoom {
            BasemapMode::Satellite
        } else {
            BasemapMode::Vector
        }
    }

    pub fn is_satellite(self) -> bool {
        self == BasemapMode::Satellite
    }
}

#[cfg(test)]
mod tests {
    use super::BasemapMode;

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(BasemapMode::for_zoom(11.0, 11.0), BasemapMode::Vector);
        assert_eq!(BasemapMode::for_zoom(12.0, 11.0), BasemapMode::Satellite);
        assert_eq!(BasemapMode::for_zoom(4.0, 11.0), BasemapMode::Vector);
    }
}
