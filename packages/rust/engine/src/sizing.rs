//! Group-size determination: deal band, company scale, then pool reality.
//!
//! The sizer never fails. Whatever the pool looks like, it produces
//! consistent constraints (`min <= ideal <= max`) and an audit string
//! explaining each adjustment.

use buyerscope_shared::{DiscoveryConfig, SizeConstraints, SizingOverride};

use crate::scoring::DealBand;

/// Base committee size per deal band as (min, max, ideal).
fn band_bounds(band: DealBand) -> (usize, usize, usize) {
    match band {
        DealBand::Smb => (2, 4, 3),
        DealBand::MidMarket => (2, 6, 4),
        DealBand::Enterprise => (3, 8, 5),
        DealBand::Major => (4, 10, 7),
        DealBand::Strategic => (5, 12, 8),
    }
}

/// Derives [`SizeConstraints`] for one run.
pub struct GroupSizer {
    band: DealBand,
    headcount: Option<u32>,
    override_bounds: Option<SizingOverride>,
}

impl GroupSizer {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            band: DealBand::from_usd(config.deal_size_usd),
            headcount: config.company.headcount,
            override_bounds: config.sizing_override,
        }
    }

    /// Compute constraints for the given candidate pool size.
    pub fn constraints(&self, pool_size: usize) -> SizeConstraints {
        let mut notes: Vec<String> = Vec::new();

        let (mut min, mut max, mut ideal) = match self.override_bounds {
            Some(bounds) => {
                notes.push(format!(
                    "caller override {}-{} (ideal {})",
                    bounds.min, bounds.max, bounds.ideal
                ));
                (bounds.min, bounds.max, bounds.ideal)
            }
            None => {
                let (min, max, ideal) = band_bounds(self.band);
                notes.push(format!(
                    "{} deal band suggests {min}-{max} (ideal {ideal})",
                    self.band.label()
                ));
                let (min, max, ideal) = self.scale_for_headcount(min, max, ideal, &mut notes);
                (min, max, ideal)
            }
        };

        let mut accept_single_person = false;
        if pool_size < min {
            // Pool cannot satisfy the minimum. Take what exists instead of
            // failing the run.
            accept_single_person = true;
            min = 1;
            max = pool_size.max(1);
            ideal = ideal.min(max);
            notes.push(format!(
                "pool of {pool_size} is below the minimum; accepting any group size down to one"
            ));
        } else if pool_size < max {
            max = pool_size;
            ideal = ideal.min(max);
            notes.push(format!("pool of {pool_size} caps the maximum"));
        }

        if min <= 1 {
            accept_single_person = true;
        }

        SizeConstraints {
            min,
            max,
            ideal,
            accept_single_person,
            reasoning: notes.join("; "),
        }
    }

    /// Company scale nudges the band bounds: tiny companies run lean
    /// committees, very large ones add review layers.
    fn scale_for_headcount(
        &self,
        min: usize,
        max: usize,
        ideal: usize,
        notes: &mut Vec<String>,
    ) -> (usize, usize, usize) {
        match self.headcount {
            Some(headcount) if headcount < 50 => {
                let min = min.saturating_sub(1).max(1);
                let ideal = ideal.saturating_sub(1).max(min);
                let max = max.saturating_sub(2).max(ideal);
                notes.push(format!("small company (headcount {headcount}) shrinks the band"));
                (min, max, ideal)
            }
            Some(headcount) if headcount > 5000 => {
                notes.push(format!("large company (headcount {headcount}) widens the band"));
                (min, max + 2, ideal + 1)
            }
            _ => (min, max, ideal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buyerscope_shared::{CompanyIntel, ProductCategory};

    fn make_config(deal_size: f64) -> DiscoveryConfig {
        DiscoveryConfig::new(
            CompanyIntel::named("Acme Corp"),
            deal_size,
            ProductCategory::Sales,
        )
    }

    #[test]
    fn bands_scale_with_deal_size() {
        let cases = [
            (30_000.0, (2, 4, 3)),
            (100_000.0, (2, 6, 4)),
            (150_000.0, (3, 8, 5)),
            (600_000.0, (4, 10, 7)),
            (1_500_000.0, (5, 12, 8)),
        ];
        for (deal_size, (min, max, ideal)) in cases {
            let constraints = GroupSizer::new(&make_config(deal_size)).constraints(50);
            assert_eq!((constraints.min, constraints.max, constraints.ideal), (min, max, ideal));
            assert!(constraints.is_consistent());
        }
    }

    #[test]
    fn small_companies_shrink_the_band() {
        let mut config = make_config(100_000.0);
        config.company.headcount = Some(40);
        let constraints = GroupSizer::new(&config).constraints(50);
        assert_eq!((constraints.min, constraints.max, constraints.ideal), (1, 4, 3));
        assert!(constraints.accept_single_person);
        assert!(constraints.reasoning.contains("headcount 40"));
    }

    #[test]
    fn large_companies_widen_the_band() {
        let mut config = make_config(150_000.0);
        config.company.headcount = Some(8000);
        let constraints = GroupSizer::new(&config).constraints(50);
        assert_eq!((constraints.min, constraints.max, constraints.ideal), (3, 10, 6));
    }

    #[test]
    fn pool_caps_the_maximum() {
        let constraints = GroupSizer::new(&make_config(150_000.0)).constraints(4);
        assert_eq!((constraints.min, constraints.max, constraints.ideal), (3, 4, 4));
        assert!(!constraints.accept_single_person);
        assert!(constraints.reasoning.contains("pool of 4"));
    }

    #[test]
    fn single_candidate_collapses_the_constraints() {
        let mut config = make_config(100_000.0);
        config.sizing_override = Some(SizingOverride {
            min: 2,
            max: 6,
            ideal: 4,
        });
        let constraints = GroupSizer::new(&config).constraints(1);
        assert_eq!((constraints.min, constraints.max, constraints.ideal), (1, 1, 1));
        assert!(constraints.accept_single_person);
        assert!(constraints.is_consistent());
    }

    #[test]
    fn override_replaces_band_bounds() {
        let mut config = make_config(30_000.0);
        config.sizing_override = Some(SizingOverride {
            min: 4,
            max: 9,
            ideal: 6,
        });
        let constraints = GroupSizer::new(&config).constraints(50);
        assert_eq!((constraints.min, constraints.max, constraints.ideal), (4, 9, 6));
        assert!(!constraints.accept_single_person);
        assert!(constraints.reasoning.contains("override"));
    }

    #[test]
    fn empty_pool_still_yields_consistent_constraints() {
        let constraints = GroupSizer::new(&make_config(150_000.0)).constraints(0);
        assert!(constraints.is_consistent());
        assert_eq!(constraints.max, 1);
        assert!(constraints.accept_single_person);
    }
}
