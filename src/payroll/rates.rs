use std::{collections::{BTreeMap, HashSet}, fs, path::{Path, PathBuf}};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// What a rate line is multiplied against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BaseKind {
    /// The whole gross salary
    Gross,
    /// `min(gross, monthly ceiling)`
    Capped,
}

/// Row of the flat (quick preview) view. Detailed lines roll up into one group each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContributionGroup {
    CsgCrds,
    Health,
    Unemployment,
    BasePension,
    ComplementaryPension,
    Welfare,
    WorkplaceAccidents,
    FamilyAllowance,
    ProfessionalTraining,
    OtherContributions,
    Reductions,
}

impl ContributionGroup {
    pub fn code(self) -> &'static str {
        match self {
            ContributionGroup::CsgCrds => "csg_crds",
            ContributionGroup::Health => "health",
            ContributionGroup::Unemployment => "unemployment",
            ContributionGroup::BasePension => "base_pension",
            ContributionGroup::ComplementaryPension => "complementary_pension",
            ContributionGroup::Welfare => "welfare",
            ContributionGroup::WorkplaceAccidents => "workplace_accidents",
            ContributionGroup::FamilyAllowance => "family_allowance",
            ContributionGroup::ProfessionalTraining => "professional_training",
            ContributionGroup::OtherContributions => "other_contributions",
            ContributionGroup::Reductions => "reductions",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContributionGroup::CsgCrds => "CSG + CRDS",
            ContributionGroup::Health => "Health insurance",
            ContributionGroup::Unemployment => "Unemployment insurance",
            ContributionGroup::BasePension => "Base pension",
            ContributionGroup::ComplementaryPension => "Complementary pension",
            ContributionGroup::Welfare => "Welfare (prévoyance)",
            ContributionGroup::WorkplaceAccidents => "Workplace accidents",
            ContributionGroup::FamilyAllowance => "Family allowance",
            ContributionGroup::ProfessionalTraining => "Professional training",
            ContributionGroup::OtherContributions => "Other employer contributions",
            ContributionGroup::Reductions => "Exemptions and reductions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLine {
    pub code: String,
    pub label: String,
    pub group: ContributionGroup,
    pub base: BaseKind,
    /// Fraction of the base, `0.068` for 6.8%. Negative for reductions.
    pub rate: Decimal,
}

impl RateLine {
    fn new(code: &str, label: &str, group: ContributionGroup, base: BaseKind, rate: Decimal) -> Self {
        Self {
            code: code.to_owned(),
            label: label.to_owned(),
            group,
            base,
            rate,
        }
    }
}

/// Contribution rates in effect from `effective_year` onward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub effective_year: i32,
    /// Plafond mensuel de la sécurité sociale
    pub monthly_ceiling: Decimal,
    pub employee: Vec<RateLine>,
    pub employer: Vec<RateLine>,
}

impl RateTable {
    /// Standard general-regime table with the given ceiling
    pub fn standard(effective_year: i32, monthly_ceiling: Decimal) -> Self {
        use BaseKind::*;
        use ContributionGroup::*;

        let employee = vec![
            RateLine::new("csg_deductible", "CSG deductible", CsgCrds, Gross, dec!(0.068)),
            RateLine::new("csg_crds_non_deductible", "CSG non-deductible + CRDS", CsgCrds, Gross, dec!(0.030)),
            RateLine::new("health", "Health insurance", Health, Gross, dec!(0.007)),
            RateLine::new("unemployment", "Unemployment insurance", Unemployment, Gross, dec!(0.024)),
            RateLine::new("base_pension_capped", "Base pension, capped", BasePension, Capped, dec!(0.065)),
            RateLine::new("base_pension_uncapped", "Base pension, uncapped", BasePension, Gross, dec!(0.004)),
            RateLine::new("complementary_pension_t1", "Complementary pension, tranche 1", ComplementaryPension, Capped, dec!(0.039)),
            RateLine::new("welfare", "Welfare (prévoyance)", Welfare, Gross, dec!(0.005)),
        ];

        let employer = vec![
            RateLine::new("health", "Health insurance", Health, Gross, dec!(0.07)),
            RateLine::new("workplace_accidents", "Workplace accidents", WorkplaceAccidents, Gross, dec!(0.0096)),
            RateLine::new("base_pension_capped", "Base pension, capped", BasePension, Capped, dec!(0.0855)),
            RateLine::new("base_pension_uncapped", "Base pension, uncapped", BasePension, Gross, dec!(0.0202)),
            RateLine::new("complementary_pension_t1", "Complementary pension, tranche 1", ComplementaryPension, Capped, dec!(0.0601)),
            RateLine::new("family_allowance", "Family allowance", FamilyAllowance, Gross, dec!(0.0345)),
            RateLine::new("unemployment", "Unemployment insurance", Unemployment, Gross, dec!(0.0425)),
            RateLine::new("professional_training", "Professional training", ProfessionalTraining, Gross, dec!(0.006)),
            RateLine::new("other_contributions", "Other employer contributions", OtherContributions, Gross, dec!(0.01946)),
            RateLine::new("reductions", "Exemptions and reductions", Reductions, Gross, dec!(-0.22)),
        ];

        Self {
            effective_year,
            monthly_ceiling,
            employee,
            employer,
        }
    }

    /// Nominal sum of employee rates, i.e. the deduction rate below the ceiling
    pub fn employee_rate_sum(&self) -> Decimal {
        self.employee.iter().map(|line| line.rate).sum()
    }

    /// Base for capped lines, never above the ceiling
    pub fn capped_base(&self, gross_salary: Decimal) -> Decimal {
        gross_salary.min(self.monthly_ceiling).max(Decimal::ZERO)
    }

    pub fn validate(&self) -> Result<(), RateTableError> {
        let year = self.effective_year;

        if self.monthly_ceiling <= Decimal::ZERO {
            return Err(RateTableError::NonPositiveCeiling { year, ceiling: self.monthly_ceiling });
        }

        let sum = self.employee_rate_sum();
        if sum >= Decimal::ONE {
            return Err(RateTableError::EmployeeRatesTooHigh { year, sum });
        }

        for lines in [&self.employee, &self.employer] {
            let mut seen = HashSet::new();
            if let Some(line) = lines.iter().find(|line| !seen.insert(line.code.as_str())) {
                return Err(RateTableError::DuplicateCode { year, code: line.code.clone() });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RateTableError {
    #[error("monthly ceiling of the {year} rate table must be positive, got {ceiling}")]
    NonPositiveCeiling { year: i32, ceiling: Decimal },

    #[error("employee rates of the {year} rate table sum to {sum}, which leaves no net salary")]
    EmployeeRatesTooHigh { year: i32, sum: Decimal },

    #[error("rate line `{code}` appears twice in the {year} rate table")]
    DuplicateCode { year: i32, code: String },

    #[error("no rate table in effect for {0}")]
    NoTableForYear(i32),

    #[error("unable to read rate tables from `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rate tables in `{}`", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Rate tables keyed by effective year
#[derive(Debug, Clone, Default)]
pub struct RateRegistry {
    tables: BTreeMap<i32, RateTable>,
}

impl RateRegistry {
    /// Tables shipped with the service
    pub fn builtin() -> Self {
        let tables = [
            RateTable::standard(2024, dec!(3864)),
            RateTable::standard(2025, dec!(3925)),
            RateTable::standard(2026, dec!(4005)),
        ];

        Self {
            tables: tables.into_iter().map(|table| (table.effective_year, table)).collect(),
        }
    }

    /// Adds or replaces the table for its effective year
    pub fn insert(&mut self, table: RateTable) -> Result<(), RateTableError> {
        table.validate()?;

        debug!(year = table.effective_year, ceiling = %table.monthly_ceiling, "Registering rate table");
        self.tables.insert(table.effective_year, table);

        Ok(())
    }

    /// Loads a JSON array of rate tables, returns how many were registered
    pub fn load_json(&mut self, path: &Path) -> Result<usize, RateTableError> {
        let raw = fs::read_to_string(path).map_err(|source| RateTableError::Io { path: path.to_owned(), source })?;
        let tables: Vec<RateTable> = serde_json::from_str(&raw).map_err(|source| RateTableError::Parse { path: path.to_owned(), source })?;

        let count = tables.len();
        for table in tables {
            self.insert(table)?;
        }

        info!(count, path = %path.display(), "Loaded rate tables");

        Ok(count)
    }

    /// Latest table whose effective year is not after `year`
    pub fn for_year(&self, year: i32) -> Result<&RateTable, RateTableError> {
        self.tables
            .range(..=year)
            .next_back()
            .map(|(_, table)| table)
            .ok_or(RateTableError::NoTableForYear(year))
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.tables.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_are_valid() {
        let registry = RateRegistry::builtin();

        assert_eq!(registry.years().collect::<Vec<_>>(), vec![2024, 2025, 2026]);
        for year in registry.years() {
            registry.for_year(year).unwrap().validate().unwrap();
        }
    }

    #[test]
    fn test_flat_employee_rates() {
        let table = RateTable::standard(2025, dec!(3925));

        assert_eq!(table.employee_rate_sum(), dec!(0.242));
        assert!(table.employee_rate_sum() < Decimal::ONE);

        let group_rate = |group: ContributionGroup| table.employee.iter().filter(|l| l.group == group).map(|l| l.rate).sum::<Decimal>();
        assert_eq!(group_rate(ContributionGroup::CsgCrds), dec!(0.098));
        assert_eq!(group_rate(ContributionGroup::Health), dec!(0.007));
        assert_eq!(group_rate(ContributionGroup::Unemployment), dec!(0.024));
        assert_eq!(group_rate(ContributionGroup::BasePension), dec!(0.069));
        assert_eq!(group_rate(ContributionGroup::ComplementaryPension), dec!(0.039));
        assert_eq!(group_rate(ContributionGroup::Welfare), dec!(0.005));
    }

    #[test]
    fn test_capped_base() {
        let table = RateTable::standard(2025, dec!(3925));

        assert_eq!(table.capped_base(dec!(5000)), dec!(3925));
        assert_eq!(table.capped_base(dec!(3033.40)), dec!(3033.40));
        assert_eq!(table.capped_base(dec!(1000000000)), dec!(3925));
        assert_eq!(table.capped_base(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_for_year_picks_latest_effective() {
        let registry = RateRegistry::builtin();

        assert_eq!(registry.for_year(2025).unwrap().monthly_ceiling, dec!(3925));
        assert_eq!(registry.for_year(2031).unwrap().effective_year, 2026);
        assert!(matches!(registry.for_year(2023), Err(RateTableError::NoTableForYear(2023))));
    }

    #[test]
    fn test_validate_rejects_broken_tables() {
        let mut table = RateTable::standard(2025, dec!(3925));
        table.employee[0].rate = dec!(0.9);
        assert!(matches!(table.validate(), Err(RateTableError::EmployeeRatesTooHigh { year: 2025, .. })));

        let mut table = RateTable::standard(2025, dec!(3925));
        table.monthly_ceiling = Decimal::ZERO;
        assert!(matches!(table.validate(), Err(RateTableError::NonPositiveCeiling { .. })));

        let mut table = RateTable::standard(2025, dec!(3925));
        let duplicate = table.employer[0].clone();
        table.employer.push(duplicate);
        assert!(matches!(table.validate(), Err(RateTableError::DuplicateCode { code, .. }) if code == "health"));

        let mut registry = RateRegistry::default();
        let mut table = RateTable::standard(2027, dec!(4100));
        table.employee[1].rate = dec!(1);
        assert!(registry.insert(table).is_err());
        assert!(registry.for_year(2027).is_err());
    }

    #[test]
    fn test_load_json_overrides_year() {
        let mut table = RateTable::standard(2025, dec!(3950));
        table.employee.retain(|line| line.code != "welfare");

        let path = std::env::temp_dir().join(format!("rate-tables-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, serde_json::to_string(&vec![table.clone()]).unwrap()).unwrap();

        let mut registry = RateRegistry::builtin();
        let loaded = registry.load_json(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.unwrap(), 1);
        assert_eq!(registry.for_year(2025).unwrap(), &table);
        assert_eq!(registry.for_year(2024).unwrap().monthly_ceiling, dec!(3864));
    }

    #[test]
    fn test_load_json_reports_missing_file() {
        let mut registry = RateRegistry::builtin();

        let err = registry.load_json(Path::new("/nonexistent/rate-tables.json")).unwrap_err();
        assert!(matches!(err, RateTableError::Io { .. }));
    }
}
