//! BetProposal → IpatBetLine conversion (the gateway wire format).

use crate::models::{BetProposal, BetType, IpatBetLine, RaceId};

/// Converts one `BetProposal` into the gateway's wire row. `race_id` is
/// parsed once per race by the caller and supplied here rather than
/// re-parsed per proposal.
pub fn to_ipat_bet_line(race_id: &RaceId, proposal: &BetProposal) -> IpatBetLine {
    IpatBetLine {
        opdt: race_id.opdt.clone(),
        venue_code: format!("{:02}", race_id.venue_code),
        race_number: race_id.race_number,
        bet_type: proposal.bet_type,
        number: format_number(proposal.bet_type, &proposal.horse_numbers),
        amount: proposal.amount_yen,
    }
}

/// Zero-pads each horse to 2 digits and hyphen-joins. Exacta preserves the
/// proposal's order (finish order); everything else is already sorted by
/// the generator that produced it.
fn format_number(_bet_type: BetType, horse_numbers: &[u32]) -> String {
    horse_numbers
        .iter()
        .map(|h| format!("{h:02}"))
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_win_bet() {
        let race_id = RaceId::parse("20260208_08_11").unwrap();
        let proposal = BetProposal {
            bet_type: BetType::Win,
            horse_numbers: vec![3],
            amount_yen: 400,
        };
        let line = to_ipat_bet_line(&race_id, &proposal);
        assert_eq!(line.opdt, "20260208");
        assert_eq!(line.venue_code, "08");
        assert_eq!(line.race_number, 11);
        assert_eq!(line.number, "03");
        assert_eq!(line.bet_type.ipat_bet_type(), "tansyo");
        line.validate().unwrap();
    }

    #[test]
    fn exacta_preserves_finish_order() {
        let race_id = RaceId::parse("20260208_08_11").unwrap();
        let proposal = BetProposal {
            bet_type: BetType::Exacta,
            horse_numbers: vec![7, 3],
            amount_yen: 100,
        };
        let line = to_ipat_bet_line(&race_id, &proposal);
        assert_eq!(line.number, "07-03");
        assert_eq!(line.bet_type.ipat_bet_type(), "umatan");
    }
}
