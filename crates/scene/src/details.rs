use std::cell::RefCell;

use catalog::{SupplierIndex, is_all_materials};
use chrono::NaiveDate;
use formats::{CardConfig, SupplierCard};

/// Side panel listing the suppliers of one municipality.
pub trait DetailPanel {
    fn set_title(&self, title: &str);
    /// Clears the card container and fills it with `cards`, in order.
    fn replace_cards(&self, cards: &[SupplierCard]);
    fn slide_in(&self);
    fn slide_out(&self);
}

impl<T: DetailPanel + ?Sized> DetailPanel for std::rc::Rc<T> {
    fn set_title(&self, title: &str) {
        (**self).set_title(title)
    }

    fn replace_cards(&self, cards: &[SupplierCard]) {
        (**self).replace_cards(cards)
    }

    fn slide_in(&self) {
        (**self).slide_in()
    }

    fn slide_out(&self) {
        (**self).slide_out()
    }
}

#[derive(Debug)]
pub struct SupplierDetails<P> {
    panel: P,
    cards: CardConfig,
    open_key: RefCell<Option<String>>,
}

impl<P: DetailPanel> SupplierDetails<P> {
    pub fn new(panel: P, cards: CardConfig) -> Self {
        Self {
            panel,
            cards,
            open_key: RefCell::new(None),
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Shows the suppliers of `city_key`, optionally only those dealing in
    /// `material`. Returns `false` and leaves the panel untouched when the
    /// key has no (matching) suppliers.
    pub fn open(
        &self,
        index: &SupplierIndex,
        city_key: &str,
        material: Option<&str>,
        today: NaiveDate,
    ) -> bool {
        let Some(suppliers) = index.suppliers(city_key) else {
            return false;
        };
        let shown: Vec<_> = suppliers
            .iter()
            .filter(|s| match material {
                Some(m) if !is_all_materials(m) => s.material_type == m,
                _ => true,
            })
            .collect();
        let Some(first) = shown.first() else {
            return false;
        };

        let cards: Vec<_> = shown
            .iter()
            .map(|s| SupplierCard::render(s, &self.cards, today))
            .collect();

        self.panel.set_title(&first.city.name);
        self.panel.replace_cards(&cards);
        self.panel.slide_in();
        *self.open_key.borrow_mut() = Some(city_key.to_string());
        true
    }

    pub fn close(&self) {
        self.panel.slide_out();
        self.open_key.borrow_mut().take();
    }

    /// City key currently shown, if the panel is open.
    pub fn open_key(&self) -> Option<String> {
        self.open_key.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use catalog::SupplierIndex;
    use chrono::NaiveDate;
    use formats::CardConfig;
    use formats::palette::GOOD_RATING_COLOR;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::SupplierDetails;
    use crate::testing::{PanelCall, RecordingPanel};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn index() -> SupplierIndex {
        SupplierIndex::from_json(json!([
            {"id": 1, "corporate_name": "Carvoaria Sul", "state": {"abbr": "MG"},
             "city": {"name": "Sete Lagoas"}, "material_type": "Carvão Vegetal", "rating": 85},
            {"id": 2, "corporate_name": "Mineração Norte", "state": {"abbr": "MG"},
             "city": {"name": "Sete Lagoas"}, "material_type": "Minério de Ferro", "rating": 40}
        ]))
        .unwrap()
    }

    #[test]
    fn opens_with_title_and_cards() {
        let details = SupplierDetails::new(RecordingPanel::default(), CardConfig::default());
        assert!(details.open(&index(), "31-Sete Lagoas", None, today()));

        let calls = details.panel().calls();
        assert_eq!(
            calls,
            vec![
                PanelCall::Title("Sete Lagoas".into()),
                PanelCall::Cards(vec![1, 2]),
                PanelCall::SlideIn,
            ]
        );
        let cards = details.panel().last_cards();
        assert_eq!(cards[0].rating_color, GOOD_RATING_COLOR);
        assert_eq!(details.open_key().as_deref(), Some("31-Sete Lagoas"));
    }

    #[test]
    fn unknown_key_is_a_silent_no_op() {
        let details = SupplierDetails::new(RecordingPanel::default(), CardConfig::default());
        assert!(!details.open(&index(), "31-Belo Horizonte", None, today()));
        assert!(details.panel().calls().is_empty());
        assert_eq!(details.open_key(), None);
    }

    #[test]
    fn material_filter_narrows_cards() {
        let details = SupplierDetails::new(RecordingPanel::default(), CardConfig::default());
        assert!(details.open(&index(), "31-Sete Lagoas", Some("Minério de Ferro"), today()));
        assert_eq!(details.panel().last_cards().len(), 1);
        assert!(details.open(&index(), "31-Sete Lagoas", Some("Todos"), today()));
        assert_eq!(details.panel().last_cards().len(), 2);
        assert!(!details.open(&index(), "31-Sete Lagoas", Some("Calcário"), today()));
    }

    #[test]
    fn close_slides_out() {
        let details = SupplierDetails::new(RecordingPanel::default(), CardConfig::default());
        details.open(&index(), "31-Sete Lagoas", None, today());
        details.close();
        assert_eq!(details.panel().calls().last(), Some(&PanelCall::SlideOut));
        assert_eq!(details.open_key(), None);
    }
}
