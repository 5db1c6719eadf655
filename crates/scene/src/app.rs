use catalog::{ALL_MATERIALS, SupplierIndex};
use chrono::NaiveDate;
use streaming::Fetch;

use crate::config::MapConfig;
use crate::controller::{MapController, MapError};
use crate::details::DetailPanel;
use crate::surface::MapSurface;

#[derive(Debug, Clone, PartialEq)]
pub struct StartReport {
    /// Material filter entries, "all" first.
    pub filter_options: Vec<String>,
    pub cities_with_suppliers: usize,
    pub states_attached: bool,
}

/// Application context built once at startup and handed to whatever needs
/// the map.
pub struct MapApp<F, S, P> {
    controller: MapController<F, S, P>,
}

impl<F: Fetch, S: MapSurface, P: DetailPanel> MapApp<F, S, P> {
    pub fn new(config: MapConfig, fetcher: F, surface: S, panel: P, today: fn() -> NaiveDate) -> Self {
        Self {
            controller: MapController::new(config, fetcher, surface, panel, today),
        }
    }

    pub fn controller(&self) -> &MapController<F, S, P> {
        &self.controller
    }

    /// Fetches the supplier list and installs its index. Returns the
    /// material filter options.
    pub async fn load_suppliers(&self) -> Result<Vec<String>, MapError> {
        let c = &self.controller;
        let url = &c.config().sources.suppliers_url;
        let body = c
            .cache()
            .fetcher()
            .get_json(url)
            .await
            .map_err(|e| c.fail("suppliers", e))?;
        let index = SupplierIndex::from_json(body).map_err(|e| c.fail("suppliers", e))?;

        let options = index.filter_options();
        c.events().info(
            "suppliers",
            format!(
                "{} suppliers in {} municipalities",
                index.supplier_count(),
                index.city_count()
            ),
        );
        c.set_supplier_index(index);
        Ok(options)
    }

    /// Suppliers first, then the national state layer. A supplier failure
    /// aborts startup; a state layer failure is recorded and startup
    /// continues with an empty map.
    pub async fn start(&self) -> Result<StartReport, MapError> {
        let filter_options = self.load_suppliers().await?;
        self.controller.set_active_material_type(ALL_MATERIALS);
        let states_attached = self.controller.load_states().await.is_ok();
        Ok(StartReport {
            filter_options,
            cities_with_suppliers: self.controller.supplier_index().city_count(),
            states_attached,
        })
    }
}
