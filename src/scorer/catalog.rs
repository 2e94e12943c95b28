use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::scorer::models::MissingPrediction;
use crate::scorer::prize::Prize;
use crate::scorer::registry::{StrategyRegistry, KNOCKOUT, LIVERMORE, SPOT_ON};
use crate::types::{League, PrizeSlot};

/// Configuration form of a prize. Strategy names resolve through a
/// [`StrategyRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeDefinition {
    pub code: String,
    pub name: String,
    pub scorer: String,
    #[serde(default)]
    pub filters: Vec<String>,
    /// Delegate scorer for players who made no prediction.
    #[serde(default)]
    pub missing_prediction: Option<String>,
}

impl PrizeDefinition {
    fn new(code: &str, name: &str, scorer: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            scorer: scorer.to_string(),
            filters: Vec::new(),
            missing_prediction: None,
        }
    }

    pub fn build(&self, registry: &StrategyRegistry) -> Result<Prize> {
        let mut prize = Prize::new(&self.code, &self.name, registry.scorer(&self.scorer)?);

        if !self.filters.is_empty() {
            let filters = self
                .filters
                .iter()
                .map(|name| registry.filter(name))
                .collect::<Result<Vec<_>>>()?;
            prize = prize.with_filters(filters);
        }

        if let Some(delegate) = &self.missing_prediction {
            let delegate = registry.scorer(delegate)?;
            prize = prize.with_missing_prediction_scorer(Arc::new(MissingPrediction::new(delegate)));
        }

        Ok(prize)
    }
}

/// Overall, Knockout and Spot-on.
pub fn default_definitions() -> Vec<PrizeDefinition> {
    let overall = PrizeDefinition {
        missing_prediction: Some(LIVERMORE.to_string()),
        ..PrizeDefinition::new("O", "Overall", LIVERMORE)
    };
    let knockout = PrizeDefinition {
        filters: vec![KNOCKOUT.to_string()],
        missing_prediction: Some(LIVERMORE.to_string()),
        ..PrizeDefinition::new("KO", "Knockout", LIVERMORE)
    };
    let spot_on = PrizeDefinition::new("SO", "Spot-on", SPOT_ON);

    vec![overall, knockout, spot_on]
}

/// Reads a JSON array of prize definitions.
pub fn load_definitions(path: impl AsRef<Path>) -> Result<Vec<PrizeDefinition>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

// ---------------------------------------------------------------------------
// PrizeCatalog
// ---------------------------------------------------------------------------

/// Every prize the application knows about, keyed by code. Built once at
/// startup and shared read-only afterwards.
#[derive(Debug, Default)]
pub struct PrizeCatalog {
    prizes: HashMap<String, Arc<Prize>>,
}

impl PrizeCatalog {
    /// Fails on the first duplicated code.
    pub fn new(prizes: Vec<Prize>) -> Result<Self> {
        let mut map = HashMap::with_capacity(prizes.len());
        for prize in prizes {
            if map.contains_key(prize.code()) {
                return Err(AppError::DuplicatePrize(prize.code().to_string()));
            }
            debug!(code = prize.code(), name = prize.name(), "Registered prize");
            map.insert(prize.code().to_string(), Arc::new(prize));
        }
        Ok(Self { prizes: map })
    }

    pub fn from_definitions(registry: &StrategyRegistry, definitions: &[PrizeDefinition]) -> Result<Self> {
        let prizes = definitions
            .iter()
            .map(|d| d.build(registry))
            .collect::<Result<Vec<_>>>()?;
        let catalog = Self::new(prizes)?;
        if catalog.is_empty() {
            warn!("Prize catalog is empty; no points will be recorded");
        }
        info!("Prize catalog ready with {} prizes", catalog.len());
        Ok(catalog)
    }

    /// `None` for codes nobody registered.
    pub fn get(&self, code: &str) -> Option<Arc<Prize>> {
        self.prizes.get(code).cloned()
    }

    /// The league's prizes in slot order. Empty slots are skipped, as are codes
    /// missing from the catalog.
    pub fn league_prizes(&self, league: &League) -> Vec<(PrizeSlot, Arc<Prize>)> {
        league
            .configured_prizes()
            .filter_map(|(slot, code)| match self.get(code) {
                Some(prize) => Some((slot, prize)),
                None => {
                    warn!(league = %league.code, code, "League refers to an unknown prize code");
                    None
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.prizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prizes.is_empty()
    }
}
