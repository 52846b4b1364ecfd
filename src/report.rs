use std::collections::BTreeMap;

use crate::ev::LineEv;
use crate::pipeline::sort_by_ev_desc;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub by_platform: BTreeMap<String, usize>,
    pub top: Vec<LineEv>,
    pub average_ev_percentage: Option<f64>,
    pub best_ev_percentage: Option<f64>,
}

pub fn summarize(opportunities: &[LineEv], top_n: usize) -> Summary {
    let mut by_platform: BTreeMap<String, usize> = BTreeMap::new();
    for opp in opportunities {
        *by_platform.entry(opp.line.sportsbook().to_string()).or_default() += 1;
    }

    let mut top = opportunities.to_vec();
    sort_by_ev_desc(&mut top);
    top.truncate(top_n);

    let (average_ev_percentage, best_ev_percentage) = if opportunities.is_empty() {
        (None, None)
    } else {
        let sum: f64 = opportunities.iter().map(|o| o.ev.ev_percentage).sum();
        let best = opportunities
            .iter()
            .map(|o| o.ev.ev_percentage)
            .fold(f64::NEG_INFINITY, f64::max);
        (Some(sum / opportunities.len() as f64), Some(best))
    };

    Summary {
        total: opportunities.len(),
        by_platform,
        top,
        average_ev_percentage,
        best_ev_percentage,
    }
}

impl Summary {
    /// Plain-text rendering used by the scheduler binary.
    pub fn render(&self, stake: f64) -> String {
        if self.total == 0 {
            return "No positive EV opportunities found".to_string();
        }

        let mut out = String::new();
        out.push_str("Platform breakdown:\n");
        for (platform, count) in &self.by_platform {
            out.push_str(&format!("  {platform}: {count} opportunities\n"));
        }

        out.push_str(&format!("Top {} opportunities:\n", self.top.len()));
        for (idx, opp) in self.top.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {} - {} {} {} ({})\n     EV: {:+.1}% | ${:.2} per ${:.0} | book {} vs market {:.0}\n",
                idx + 1,
                opp.line.player_name(),
                opp.line.market_type(),
                opp.line.over_under(),
                opp.line.line_value(),
                opp.line.sportsbook(),
                opp.ev.ev_percentage,
                opp.ev.ev_dollars,
                stake,
                opp.line.odds(),
                opp.market_odds,
            ));
        }

        if let (Some(avg), Some(best)) = (self.average_ev_percentage, self.best_ev_percentage) {
            out.push_str(&format!(
                "Total: {} | Average EV: {:+.1}% | Best EV: {:+.1}%",
                self.total, avg, best
            ));
        }
        out
    }
}
