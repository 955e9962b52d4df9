//! Five-way majority vote over the atomic strategies.

use crate::domain::signal::Signal;
use crate::domain::strategy::{
    BollingerStrategy, MaCrossStrategy, MacdStrategy, RsiStrategy, SignalContext, Strategy,
    VolatilityBreakoutStrategy,
};

/// Votes needed for a decision.
pub const QUORUM: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct CombinedStrategy {
    ma: MaCrossStrategy,
    rsi: RsiStrategy,
    macd: MacdStrategy,
    bollinger: BollingerStrategy,
    breakout: VolatilityBreakoutStrategy,
}

impl CombinedStrategy {
    pub fn new(rsi: RsiStrategy, breakout: VolatilityBreakoutStrategy) -> Self {
        Self {
            rsi,
            breakout,
            ..Self::default()
        }
    }

    /// Each member's vote, in the order ma, rsi, macd, bb, volatility.
    pub fn votes(&mut self, ctx: &SignalContext<'_>) -> [Signal; 5] {
        [
            self.ma.generate_signal(ctx),
            self.rsi.generate_signal(ctx),
            self.macd.generate_signal(ctx),
            self.bollinger.generate_signal(ctx),
            self.breakout.generate_signal(ctx),
        ]
    }
}

/// Buy or Sell needs at least [`QUORUM`] votes and more votes than the other
/// side. Anything else, ties included, is Hold.
pub fn tally(votes: &[Signal]) -> Signal {
    let buys = votes.iter().filter(|s| **s == Signal::Buy).count();
    let sells = votes.iter().filter(|s| **s == Signal::Sell).count();

    if buys >= QUORUM && buys > sells {
        Signal::Buy
    } else if sells >= QUORUM && sells > buys {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

impl Strategy for CombinedStrategy {
    fn name(&self) -> &'static str {
        "combined"
    }

    fn generate_signal(&mut self, ctx: &SignalContext<'_>) -> Signal {
        tally(&self.votes(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::MaTrend;
    use crate::domain::strategy::test_support::{blank_snapshot, noon};
    use crate::domain::signal::Signal::{Buy, Hold, Sell};

    #[test]
    fn tally_majority_buy() {
        assert_eq!(tally(&[Buy, Buy, Buy, Sell, Hold]), Buy);
    }

    #[test]
    fn tally_no_strict_majority_holds() {
        assert_eq!(tally(&[Buy, Buy, Sell, Sell, Hold]), Hold);
    }

    #[test]
    fn tally_majority_sell() {
        assert_eq!(tally(&[Sell, Sell, Sell, Buy, Buy]), Sell);
    }

    #[test]
    fn tally_sub_quorum_holds() {
        assert_eq!(tally(&[Buy, Buy, Hold, Hold, Hold]), Hold);
        assert_eq!(tally(&[Hold; 5]), Hold);
    }

    #[test]
    fn members_vote_together() {
        let mut snap = blank_snapshot(&[]);
        snap.ma_trend = MaTrend {
            above_ma5: true,
            above_ma20: true,
            ..MaTrend::default()
        };
        snap.rsi = 25.0;
        snap.bb_position = 0.01;

        let mut s = CombinedStrategy::default();
        let ctx = SignalContext::new(&snap, noon());
        assert_eq!(s.votes(&ctx), [Buy, Buy, Hold, Buy, Hold]);
        assert_eq!(s.generate_signal(&ctx), Buy);
    }

    #[test]
    fn two_votes_are_not_enough() {
        let mut snap = blank_snapshot(&[]);
        snap.rsi = 80.0;
        snap.bb_position = 0.99;

        let mut s = CombinedStrategy::default();
        assert_eq!(
            s.generate_signal(&SignalContext::new(&snap, noon())),
            Hold
        );
    }
}
