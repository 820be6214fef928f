// Trade valuation: a weighted linear score per player, summed per side.
//
// value = prior_points * w_prior
//       + projected_points * w_projected * rookie_multiplier
//       + bye_week_penalty            (only while the bye is still ahead)
//       + injury_risk * w_injury

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::TradeWeights;
use crate::store::{LookupError, ReferenceStore};

// ---------------------------------------------------------------------------
// Injury risk input
// ---------------------------------------------------------------------------

/// Per-player injury risk factors in [0, 1] for one side of a trade.
/// Players without an entry carry no risk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjuryRisks {
    risks: HashMap<String, f64>,
}

impl InjuryRisks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a risk factor, clamped into [0, 1].
    pub fn insert(&mut self, name: impl Into<String>, risk: f64) {
        self.risks.insert(name.into(), risk.clamp(0.0, 1.0));
    }

    /// Record a 1-10 likelihood rating as a risk factor (rating / 10).
    pub fn insert_rating(&mut self, name: impl Into<String>, rating: u8) {
        self.insert(name, f64::from(rating) / 10.0);
    }

    pub fn get(&self, name: &str) -> f64 {
        self.risks.get(name).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.risks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.risks.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for InjuryRisks {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut risks = InjuryRisks::new();
        for (name, risk) in iter {
            risks.insert(name, risk);
        }
        risks
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One player's value split into its weighted terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerValue {
    pub name: String,
    pub prior_term: f64,
    pub projected_term: f64,
    pub rookie: bool,
    pub bye_penalty: f64,
    pub injury_penalty: f64,
    pub total: f64,
}

/// Summed value of both sides of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeValue {
    pub acquired: f64,
    pub departed: f64,
}

impl TradeValue {
    /// Strictly more value coming in than going out.
    pub fn is_favorable(&self) -> bool {
        self.acquired > self.departed
    }

    pub fn net(&self) -> f64 {
        self.acquired - self.departed
    }

    /// Side totals as the sums of per-player breakdowns.
    pub fn from_breakdowns(acquired: &[PlayerValue], departed: &[PlayerValue]) -> Self {
        let total = |side: &[PlayerValue]| side.iter().map(|p| p.total).sum::<f64>();
        TradeValue {
            acquired: total(acquired),
            departed: total(departed),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

pub struct TradeEvaluator<'a> {
    store: &'a ReferenceStore,
    current_week: u8,
    weights: TradeWeights,
}

impl<'a> TradeEvaluator<'a> {
    pub fn new(store: &'a ReferenceStore, current_week: u8) -> Self {
        Self::with_weights(store, current_week, TradeWeights::default())
    }

    pub fn with_weights(store: &'a ReferenceStore, current_week: u8, weights: TradeWeights) -> Self {
        TradeEvaluator {
            store,
            current_week,
            weights,
        }
    }

    pub fn current_week(&self) -> u8 {
        self.current_week
    }

    pub fn weights(&self) -> &TradeWeights {
        &self.weights
    }

    /// Score a single player. Fails if the player is missing from either
    /// reference table.
    pub fn evaluate_player(&self, name: &str, risks: &InjuryRisks) -> Result<f64, LookupError> {
        self.breakdown(name, risks).map(|v| v.total)
    }

    /// Score a single player and keep each weighted term.
    ///
    /// A player with exactly zero prior points is treated as a rookie and
    /// has the projected term multiplied by `rookie_multiplier`. Veterans
    /// who scored nothing last season fall under the same rule.
    pub fn breakdown(&self, name: &str, risks: &InjuryRisks) -> Result<PlayerValue, LookupError> {
        let projection = self.store.get_projection(name)?;
        let stats = self.store.get_statistics(name)?;
        let w = &self.weights;

        let prior_term = stats.prior_points * w.prior_points;

        let rookie = stats.prior_points == 0.0;
        let multiplier = if rookie { w.rookie_multiplier } else { 1.0 };
        let projected_term = projection.projected_points * w.projected_points * multiplier;

        let bye_penalty = match projection.bye_week {
            Some(bye) if self.current_week < bye => w.bye_week_penalty,
            _ => 0.0,
        };

        let injury_penalty = risks.get(name) * w.injury_risk;

        let total = prior_term + projected_term + bye_penalty + injury_penalty;
        debug!(
            "{}: prior={:.1} projected={:.1} bye={:.1} injury={:.1} total={:.1}",
            name, prior_term, projected_term, bye_penalty, injury_penalty, total
        );

        Ok(PlayerValue {
            name: name.to_string(),
            prior_term,
            projected_term,
            rookie,
            bye_penalty,
            injury_penalty,
            total,
        })
    }

    /// Sum player values for each side. Any missing player aborts the whole
    /// evaluation.
    pub fn evaluate_trade<S: AsRef<str>>(
        &self,
        acquired: &[S],
        departed: &[S],
        acquired_risks: &InjuryRisks,
        departed_risks: &InjuryRisks,
    ) -> Result<TradeValue, LookupError> {
        let value = TradeValue::from_breakdowns(
            &self.breakdown_side(acquired, acquired_risks)?,
            &self.breakdown_side(departed, departed_risks)?,
        );
        info!(
            "trade evaluated at week {}: acquired {:.1}, departed {:.1}",
            self.current_week, value.acquired, value.departed
        );
        Ok(value)
    }

    /// Breakdowns for every player on one side, in input order.
    pub fn breakdown_side<S: AsRef<str>>(
        &self,
        names: &[S],
        risks: &InjuryRisks,
    ) -> Result<Vec<PlayerValue>, LookupError> {
        names
            .iter()
            .map(|name| self.breakdown(name.as_ref(), risks))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::store::TableRow;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Store with teams on bye in week 10 (CLE) and week 5 (DET).
    fn store() -> ReferenceStore {
        let bye_weeks: HashMap<String, u8> = [("CLE", 10), ("DET", 5)]
            .into_iter()
            .map(|(t, w)| (t.to_string(), w))
            .collect();
        ReferenceStore::from_tables(
            vec![
                (
                    Position::RunningBack,
                    vec![
                        TableRow::new("Rookie Runner", "CLE", 200.0),
                        TableRow::new("Veteran Runner", "CLE", 180.0),
                        TableRow::new("Same Projection", "CLE", 200.0),
                        TableRow::new("Free Agent", "XXX", 100.0),
                    ],
                ),
                (
                    Position::WideReceiver,
                    vec![
                        TableRow::new("Lions Receiver", "DET", 220.0),
                        TableRow::new("No Stats", "DET", 90.0),
                    ],
                ),
            ],
            vec![
                (
                    Position::RunningBack,
                    vec![
                        TableRow::new("Rookie Runner", "", 0.0),
                        TableRow::new("Veteran Runner", "", 150.0),
                        TableRow::new("Same Projection", "", 100.0),
                        TableRow::new("Free Agent", "", 50.0),
                    ],
                ),
                (Position::WideReceiver, vec![TableRow::new("Lions Receiver", "", 240.0)]),
            ],
            &bye_weeks,
        )
    }

    fn risks(entries: &[(&str, f64)]) -> InjuryRisks {
        entries.iter().map(|&(n, r)| (n, r)).collect()
    }

    #[test]
    fn rookie_example_scores_375() {
        let store = store();
        let eval = TradeEvaluator::new(&store, 3);
        let value = eval
            .evaluate_player("Rookie Runner", &risks(&[("Rookie Runner", 0.2)]))
            .unwrap();
        assert!(approx_eq(value, 375.0), "got {value}");
    }

    #[test]
    fn veteran_example_scores_300() {
        let store = store();
        let eval = TradeEvaluator::new(&store, 12);
        let value = eval.evaluate_player("Veteran Runner", &InjuryRisks::new()).unwrap();
        assert!(approx_eq(value, 300.0), "got {value}");
    }

    #[test]
    fn rookie_rule_doubles_projected_term() {
        let store = store();
        let eval = TradeEvaluator::new(&store, 12);
        let rookie = eval.breakdown("Rookie Runner", &InjuryRisks::new()).unwrap();
        let veteran = eval.breakdown("Same Projection", &InjuryRisks::new()).unwrap();
        assert!(rookie.rookie);
        assert!(!veteran.rookie);
        assert!(approx_eq(rookie.projected_term, 2.0 * veteran.projected_term));
    }

    #[test]
    fn bye_penalty_only_before_bye_week() {
        let store = store();
        let none = InjuryRisks::new();

        let before = TradeEvaluator::new(&store, 9).breakdown("Veteran Runner", &none).unwrap();
        assert!(approx_eq(before.bye_penalty, -15.0));

        let on_bye = TradeEvaluator::new(&store, 10).breakdown("Veteran Runner", &none).unwrap();
        assert!(approx_eq(on_bye.bye_penalty, 0.0));

        let after = TradeEvaluator::new(&store, 11).breakdown("Veteran Runner", &none).unwrap();
        assert!(approx_eq(after.bye_penalty, 0.0));
    }

    #[test]
    fn unknown_bye_week_never_penalized() {
        let store = store();
        let eval = TradeEvaluator::new(&store, 1);
        let value = eval.breakdown("Free Agent", &InjuryRisks::new()).unwrap();
        assert!(approx_eq(value.bye_penalty, 0.0));
        assert!(approx_eq(value.total, 50.0 * 0.8 + 100.0));
    }

    #[test]
    fn injury_penalty_is_linear() {
        let store = store();
        let eval = TradeEvaluator::new(&store, 12);
        for (risk, expected) in [(0.0, 0.0), (0.5, -25.0), (1.0, -50.0)] {
            let value = eval
                .breakdown("Veteran Runner", &risks(&[("Veteran Runner", risk)]))
                .unwrap();
            assert!(approx_eq(value.injury_penalty, expected), "risk {risk}");
        }
    }

    #[test]
    fn risk_for_other_player_ignored() {
        let store = store();
        let eval = TradeEvaluator::new(&store, 12);
        let value = eval
            .evaluate_player("Veteran Runner", &risks(&[("Rookie Runner", 1.0)]))
            .unwrap();
        assert!(approx_eq(value, 300.0));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let store = store();
        let eval = TradeEvaluator::new(&store, 4);
        let r = risks(&[("Lions Receiver", 0.3)]);
        let a = eval.evaluate_player("Lions Receiver", &r).unwrap();
        let b = eval.evaluate_player("Lions Receiver", &r).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn missing_statistics_fails() {
        let store = store();
        let eval = TradeEvaluator::new(&store, 4);
        let err = eval.evaluate_player("No Stats", &InjuryRisks::new()).unwrap_err();
        assert!(matches!(
            err,
            LookupError::PlayerNotFound { table: crate::store::Table::Statistics, .. }
        ));
    }

    #[test]
    fn trade_sums_each_side() {
        let store = store();
        let eval = TradeEvaluator::new(&store, 12);
        let value = eval
            .evaluate_trade(
                &["Veteran Runner", "Free Agent"],
                &["Lions Receiver"],
                &InjuryRisks::new(),
                &risks(&[("Lions Receiver", 1.0)]),
            )
            .unwrap();
        // 300 + (40 + 100); 240*0.8 + 220 - 50 (bye in week 5 already passed)
        assert!(approx_eq(value.acquired, 440.0));
        assert!(approx_eq(value.departed, 362.0));
        assert!(value.is_favorable());
        assert!(approx_eq(value.net(), 78.0));
    }

    #[test]
    fn equal_sides_are_not_favorable() {
        let value = TradeValue {
            acquired: 100.0,
            departed: 100.0,
        };
        assert!(!value.is_favorable());
    }

    #[test]
    fn trade_aborts_on_any_missing_player() {
        let store = store();
        let eval = TradeEvaluator::new(&store, 12);
        let err = eval
            .evaluate_trade(
                &["Veteran Runner"],
                &["Lions Receiver", "Ghost Player"],
                &InjuryRisks::new(),
                &InjuryRisks::new(),
            )
            .unwrap_err();
        assert!(matches!(err, LookupError::PlayerNotFound { ref name, .. } if name == "Ghost Player"));
    }

    #[test]
    fn custom_weights_are_used() {
        let store = store();
        let weights = TradeWeights {
            projected_points: 0.5,
            prior_points: 0.0,
            bye_week_penalty: -100.0,
            injury_risk: 0.0,
            rookie_multiplier: 3.0,
        };
        let eval = TradeEvaluator::with_weights(&store, 1, weights);
        let value = eval
            .evaluate_player("Rookie Runner", &risks(&[("Rookie Runner", 1.0)]))
            .unwrap();
        assert!(approx_eq(value, 200.0 * 0.5 * 3.0 - 100.0));
        assert_eq!(eval.weights(), &weights);
    }

    #[test]
    fn ratings_map_to_tenths_and_clamp() {
        let mut r = InjuryRisks::new();
        r.insert_rating("A", 7);
        r.insert("B", 1.7);
        r.insert("C", -0.2);
        assert!(approx_eq(r.get("A"), 0.7));
        assert!(approx_eq(r.get("B"), 1.0));
        assert!(approx_eq(r.get("C"), 0.0));
        assert!(approx_eq(r.get("D"), 0.0));
        assert_eq!(r.len(), 3);
    }
}
