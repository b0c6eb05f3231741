//! Core domain types shared across the pipeline, stores, and wire layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The four forecast sources, in the fixed order the fusion weights assume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceName {
    #[serde(rename = "umamax")]
    Umamax,
    #[serde(rename = "muryou-keiba-ai")]
    MuryouKeibaAi,
    #[serde(rename = "keiba-ai-athena")]
    KeibaAiAthena,
    #[serde(rename = "keiba-ai-navi")]
    KeibaAiNavi,
}

impl SourceName {
    pub const ALL: [SourceName; 4] = [
        SourceName::Umamax,
        SourceName::MuryouKeibaAi,
        SourceName::KeibaAiAthena,
        SourceName::KeibaAiNavi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Umamax => "umamax",
            SourceName::MuryouKeibaAi => "muryou-keiba-ai",
            SourceName::KeibaAiAthena => "keiba-ai-athena",
            SourceName::KeibaAiNavi => "keiba-ai-navi",
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SourceName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        SourceName::ALL
            .into_iter()
            .find(|src| src.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown source name: {s}"))
    }
}

/// One horse's rank/score entry inside a single source's prediction list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RankedHorse {
    pub horse_number: u32,
    pub rank: u32,
    pub score: f64,
}

/// One source's prediction for one race. Immutable once written; scrapers
/// are the only writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub race_id: String,
    pub source: SourceName,
    pub predictions: Vec<RankedHorse>,
    pub venue: String,
    pub race_number: u32,
    pub scraped_at: DateTime<Utc>,
    /// Unix-epoch seconds after which this record is no longer valid.
    pub ttl: i64,
}

impl Prediction {
    /// Checks the invariants in §3: contiguous ranks 1..N, non-increasing
    /// score with rank, horse_number within a real starting-gate range.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.predictions.is_empty() {
            anyhow::bail!(
                "prediction for {} / {} has no entries",
                self.race_id,
                self.source
            );
        }

        let mut by_rank = self.predictions.clone();
        by_rank.sort_by_key(|h| h.rank);
        for (idx, h) in by_rank.iter().enumerate() {
            let expected_rank = (idx + 1) as u32;
            if h.rank != expected_rank {
                anyhow::bail!(
                    "rank gap in {} / {}: expected rank {expected_rank}, found {}",
                    self.race_id,
                    self.source,
                    h.rank
                );
            }
            if !(1..=18).contains(&h.horse_number) {
                anyhow::bail!(
                    "horse_number {} out of range [1,18] in {} / {}",
                    h.horse_number,
                    self.race_id,
                    self.source
                );
            }
        }
        for window in by_rank.windows(2) {
            if window[1].score > window[0].score {
                anyhow::bail!(
                    "scores not monotone non-increasing with rank in {} / {}",
                    self.race_id,
                    self.source
                );
            }
        }
        Ok(())
    }

    pub fn is_expired(&self, now_unix: i64) -> bool {
        now_unix >= self.ttl
    }
}

/// Qualitative summary of how much the sources agree on the top-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusLevel {
    Full,
    Mostly,
    Partial,
    LargeDivergence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceHorse {
    pub horse_number: u32,
    pub ranks_per_source: HashMap<String, u32>,
    pub gap: u32,
}

/// Transient result of `consensus::analyze`, not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub consensus_level: ConsensusLevel,
    pub agreed_top3: Vec<u32>,
    pub divergence_horses: Vec<DivergenceHorse>,
}

/// A single odds value, e.g. win odds for one horse.
pub type OddsValue = f64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlaceOddsRange {
    pub min: f64,
    pub mid: f64,
    pub max: f64,
}

/// Market odds snapshot for one race, keyed the way the gateway returns it:
/// single horse numbers as `"NN"`, pairs as `"NN-MM"` (min horse first).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketOdds {
    #[serde(default)]
    pub win: HashMap<String, OddsValue>,
    #[serde(default)]
    pub place: HashMap<String, PlaceOddsRange>,
    #[serde(default)]
    pub quinella_place: HashMap<String, OddsValue>,
    #[serde(default)]
    pub quinella: HashMap<String, OddsValue>,
}

/// Orders a pair of horse numbers the way every pair-keyed odds map expects:
/// ascending, hyphen-joined, e.g. `(3, 11) -> "03-11"`.
pub fn pair_key(a: u32, b: u32) -> String {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    format!("{lo:02}-{hi:02}")
}

/// Fused probability distribution over horses for one race, produced by
/// `kernel::fusion::log_opinion_pool`. Sums to ~1, strictly positive.
pub type FusedDistribution = HashMap<u32, f64>;

/// How many sources placed a horse in their top-N, per `kernel::agreement`.
pub type AgreementMap = HashMap<u32, u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetType {
    Win,
    Place,
    Wide,
    Quinella,
    Exacta,
}

impl BetType {
    /// Maps to the gateway's wire-format bet type.
    pub fn ipat_bet_type(&self) -> &'static str {
        match self {
            BetType::Win => "tansyo",
            BetType::Place => "fukusyo",
            BetType::Wide => "wide",
            BetType::Quinella => "umaren",
            BetType::Exacta => "umatan",
        }
    }
}

/// One proposed bet, produced by a `bets::*` generator. `horse_numbers` is
/// ordered (exacta: finish order; everything else: ascending).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetProposal {
    pub bet_type: BetType,
    pub horse_numbers: Vec<u32>,
    pub amount_yen: i64,
}

impl BetProposal {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.amount_yen < 100 || self.amount_yen % 100 != 0 {
            anyhow::bail!(
                "bet amount {} must be >= 100 and a multiple of 100",
                self.amount_yen
            );
        }
        let expected_len = match self.bet_type {
            BetType::Win | BetType::Place => 1,
            BetType::Wide | BetType::Quinella | BetType::Exacta => 2,
        };
        if self.horse_numbers.len() != expected_len {
            anyhow::bail!(
                "{:?} bet must have {expected_len} horse numbers, got {}",
                self.bet_type,
                self.horse_numbers.len()
            );
        }
        Ok(())
    }
}

/// Rounds a yen amount to the nearest 100, with a 100-yen floor. Shared by
/// every bet generator that proposes a variable (Kelly-scaled) stake.
/// Ties round to even, matching Python's `round()` used by the reference
/// stake-sizing calculation — `round_to_nearest_hundred_yen(250.0)` is 200,
/// not 300.
pub fn round_to_nearest_hundred_yen(amount: f64) -> i64 {
    let rounded = ((amount / 100.0).round_ties_even() * 100.0) as i64;
    rounded.max(100)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Submitted,
    Completed,
    Failed,
}

impl OrderStatus {
    /// Enforces the one-way state machine: re-submission is a new order,
    /// never a backward transition.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Submitted)
                | (OrderStatus::Submitted, OrderStatus::Completed)
                | (OrderStatus::Submitted, OrderStatus::Failed)
        )
    }
}

/// One row of the gateway submission payload (the wire format).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpatBetLine {
    pub opdt: String,
    pub venue_code: String,
    pub race_number: u32,
    pub bet_type: BetType,
    pub number: String,
    pub amount: i64,
}

impl IpatBetLine {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.opdt.len() != 8 || !self.opdt.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("opdt {:?} must match ^\\d{{8}}$", self.opdt);
        }
        if !(1..=12).contains(&self.race_number) {
            anyhow::bail!("race_number {} out of range [1,12]", self.race_number);
        }
        if self.amount < 100 || self.amount % 100 != 0 {
            anyhow::bail!(
                "amount {} must be >= 100 and a multiple of 100",
                self.amount
            );
        }
        Ok(())
    }
}

/// Aggregate root for one submitted order. Status transitions are one-way
/// and must be persisted on every change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub order_id: String,
    pub user_id: String,
    pub race_id: String,
    pub bet_lines: Vec<IpatBetLine>,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub error_message: Option<String>,
}

impl PurchaseOrder {
    pub fn new(
        user_id: impl Into<String>,
        race_id: impl Into<String>,
        bet_lines: Vec<IpatBetLine>,
    ) -> Self {
        let total_amount = bet_lines.iter().map(|l| l.amount).sum();
        let now = Utc::now();
        Self {
            order_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            race_id: race_id.into(),
            bet_lines,
            total_amount,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            error_message: None,
        }
    }
}

/// Thin newtype over the `YYYYMMDD_<venue_code>_<race_number>` layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceId {
    pub opdt: String,
    pub venue_code: u8,
    pub race_number: u32,
}

impl RaceId {
    pub fn parse(race_id: &str) -> anyhow::Result<Self> {
        let mut parts = race_id.split('_');
        let opdt = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("race_id {race_id:?} missing date segment"))?;
        let venue = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("race_id {race_id:?} missing venue segment"))?;
        let race_number = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("race_id {race_id:?} missing race-number segment"))?;
        if parts.next().is_some() {
            anyhow::bail!("race_id {race_id:?} has extra segments");
        }
        if opdt.len() != 8 || !opdt.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("race_id {race_id:?} date segment must be YYYYMMDD");
        }
        let venue_code: u8 = venue
            .parse()
            .map_err(|_| anyhow::anyhow!("race_id {race_id:?} venue segment must be numeric"))?;
        if !(1..=10).contains(&venue_code) {
            anyhow::bail!("race_id {race_id:?} venue_code out of range [01,10]");
        }
        let race_number: u32 = race_number.parse().map_err(|_| {
            anyhow::anyhow!("race_id {race_id:?} race-number segment must be numeric")
        })?;
        if !(1..=12).contains(&race_number) {
            anyhow::bail!("race_id {race_id:?} race_number out of range [1,12]");
        }
        Ok(Self {
            opdt: opdt.to_string(),
            venue_code,
            race_number,
        })
    }

    /// The real JRA track name for this venue code; display/logging only.
    pub fn venue_name(&self) -> &'static str {
        match self.venue_code {
            1 => "Sapporo",
            2 => "Hakodate",
            3 => "Fukushima",
            4 => "Niigata",
            5 => "Tokyo",
            6 => "Nakayama",
            7 => "Chukyo",
            8 => "Kyoto",
            9 => "Hanshin",
            10 => "Kokura",
            _ => "Unknown",
        }
    }
}

/// Validates a bet amount against the same rule as `BetProposal::validate`
/// and `IpatBetLine::validate`, for callers that only have a raw i64.
pub fn validate_bet_amount(amount_yen: i64) -> anyhow::Result<()> {
    if amount_yen < 100 || amount_yen % 100 != 0 {
        anyhow::bail!("bet amount {amount_yen} must be >= 100 and a multiple of 100");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_orders_ascending() {
        assert_eq!(pair_key(11, 3), "03-11");
        assert_eq!(pair_key(3, 11), "03-11");
    }

    #[test]
    fn race_id_parses_layout() {
        let id = RaceId::parse("20260208_08_11").unwrap();
        assert_eq!(id.opdt, "20260208");
        assert_eq!(id.venue_code, 8);
        assert_eq!(id.race_number, 11);
        assert_eq!(id.venue_name(), "Kyoto");
    }

    #[test]
    fn race_id_rejects_bad_venue() {
        assert!(RaceId::parse("20260208_99_11").is_err());
    }

    #[test]
    fn order_status_transitions_are_one_way() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Submitted));
        assert!(OrderStatus::Submitted.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Submitted));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn rounding_floors_at_minimum() {
        assert_eq!(round_to_nearest_hundred_yen(40.0), 100);
        assert_eq!(round_to_nearest_hundred_yen(250.0), 200);
        assert_eq!(round_to_nearest_hundred_yen(260.0), 300);
    }
}
