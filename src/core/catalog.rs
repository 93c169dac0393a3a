//! Catalog store
//!
//! Reference data loaded once per invocation: the hazard and control
//! catalogs, the personnel roster, and the risk matrix. The four fetches
//! run concurrently and the load is all-or-nothing - if any one fails
//! (or the matrix fails validation) no partial catalog is kept. The
//! store is read-only after load.

use std::collections::BTreeMap;
use std::thread;

use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::core::hierarchy::Tier;
use crate::core::matrix::{MatrixError, RiskMatrix};
use crate::entities::control::Control;
use crate::entities::hazard::Hazard;
use crate::entities::person::Person;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to load {what}: {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Risk matrix configuration is invalid: {0}")]
    Matrix(#[from] MatrixError),
}

#[derive(Debug, Clone)]
pub struct Catalog {
    hazards: Vec<Hazard>,
    controls: Vec<Control>,
    personnel: Vec<Person>,
    matrix: RiskMatrix,
}

impl Catalog {
    pub fn new(
        hazards: Vec<Hazard>,
        controls: Vec<Control>,
        personnel: Vec<Person>,
        matrix: RiskMatrix,
    ) -> Self {
        Catalog {
            hazards,
            controls,
            personnel,
            matrix,
        }
    }

    /// Fetch all four collections concurrently. Fails wholesale on the
    /// first error; partial results are discarded.
    pub fn load(client: &ApiClient) -> Result<Self, CatalogError> {
        let (hazards, controls, personnel, bands) = thread::scope(|scope| {
            let hazards = scope.spawn(|| client.list_hazards());
            let controls = scope.spawn(|| client.list_controls());
            let personnel = scope.spawn(|| client.list_personnel());
            let bands = scope.spawn(|| client.risk_matrix_bands());
            (
                hazards.join().expect("catalog fetch thread panicked"),
                controls.join().expect("catalog fetch thread panicked"),
                personnel.join().expect("catalog fetch thread panicked"),
                bands.join().expect("catalog fetch thread panicked"),
            )
        });

        let hazards = hazards.map_err(|source| CatalogError::Fetch {
            what: "hazard catalog",
            source,
        })?;
        let controls = controls.map_err(|source| CatalogError::Fetch {
            what: "control catalog",
            source,
        })?;
        let personnel = personnel.map_err(|source| CatalogError::Fetch {
            what: "personnel catalog",
            source,
        })?;
        let bands = bands.map_err(|source| CatalogError::Fetch {
            what: "risk matrix",
            source,
        })?;

        let matrix = RiskMatrix::validated(bands)?;
        Ok(Catalog::new(hazards, controls, personnel, matrix))
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn personnel(&self) -> &[Person] {
        &self.personnel
    }

    pub fn matrix(&self) -> &RiskMatrix {
        &self.matrix
    }

    pub fn hazard(&self, id: i64) -> Option<&Hazard> {
        self.hazards.iter().find(|hazard| hazard.id == id)
    }

    pub fn control(&self, id: i64) -> Option<&Control> {
        self.controls.iter().find(|control| control.id == id)
    }

    pub fn person_by_name(&self, name: &str) -> Option<&Person> {
        self.personnel.iter().find(|person| person.name == name)
    }

    /// Hazards grouped by raw category, categories sorted alphabetically.
    pub fn hazards_by_category(&self) -> BTreeMap<&str, Vec<&Hazard>> {
        let mut groups: BTreeMap<&str, Vec<&Hazard>> = BTreeMap::new();
        for hazard in &self.hazards {
            groups.entry(hazard.category.as_str()).or_default().push(hazard);
        }
        groups
    }

    /// Controls folded into hierarchy-of-controls tiers, tier order first,
    /// unknown categories alphabetical after.
    pub fn controls_by_tier(&self) -> Vec<(Tier, Vec<&Control>)> {
        let mut groups: BTreeMap<Tier, Vec<&Control>> = BTreeMap::new();
        for control in &self.controls {
            groups
                .entry(Tier::for_category(&control.category))
                .or_default()
                .push(control);
        }
        groups.into_iter().collect()
    }
}
