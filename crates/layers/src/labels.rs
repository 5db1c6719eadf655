use foundation::LatLng;

pub const TOOLTIP_CLASS: &str = "custom-tooltip";
pub const HOST_TOOLTIP_CLASS: &str = "custom-tooltip custom-tooltip-host";

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub at: LatLng,
    pub permanent: bool,
    pub class_name: &'static str,
}

impl Tooltip {
    /// Follows the pointer over a municipality.
    pub fn hover(text: impl Into<String>, at: LatLng) -> Self {
        Self {
            text: text.into(),
            at,
            permanent: false,
            class_name: TOOLTIP_CLASS,
        }
    }

    /// Fixed label over the host company's own municipality.
    pub fn host(text: impl Into<String>, at: LatLng) -> Self {
        Self {
            text: text.into(),
            at,
            permanent: true,
            class_name: HOST_TOOLTIP_CLASS,
        }
    }
}
