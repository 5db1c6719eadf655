/// A geographic position in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

/// Axis-aligned geographic bounds (south-west / north-east corners).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl GeoBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        GeoBounds {
            south_west,
            north_east,
        }
    }

    pub fn from_point(p: LatLng) -> Self {
        GeoBounds::new(p, p)
    }

    /// Smallest bounds containing every point, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let mut iter = points.into_iter();
        let mut bounds = GeoBounds::from_point(iter.next()?);
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }

    pub fn union(&self, other: &GeoBounds) -> GeoBounds {
        let mut out = *self;
        out.extend(other.south_west);
        out.extend(other.north_east);
        out
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) * 0.5,
            (self.south_west.lng + self.north_east.lng) * 0.5,
        )
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lng >= self.south_west.lng
            && p.lng <= self.north_east.lng
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoBounds, LatLng};

    #[test]
    fn from_points_covers_all_inputs() {
        let b = GeoBounds::from_points([
            LatLng::new(-19.4, -44.3),
            LatLng::new(-19.6, -44.1),
            LatLng::new(-19.5, -44.5),
        ])
        .unwrap();
        assert_eq!(b.south_west, LatLng::new(-19.6, -44.5));
        assert_eq!(b.north_east, LatLng::new(-19.4, -44.1));
        assert!(b.contains(LatLng::new(-19.5, -44.2)));
        assert!(!b.contains(LatLng::new(-18.0, -44.2)));
    }

    #[test]
    fn empty_input_has_no_bounds() {
        assert!(GeoBounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn union_and_center() {
        let a = GeoBounds::from_point(LatLng::new(0.0, 0.0));
        let b = GeoBounds::from_point(LatLng::new(2.0, 4.0));
        let u = a.union(&b);
        assert_eq!(u.center(), LatLng::new(1.0, 2.0));
    }
}
