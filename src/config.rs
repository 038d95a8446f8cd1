use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use dotenvy::dotenv;

/// Which repository implementation backs the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    MySql,
    Memory,
}

/// How "check, then insert" writes are protected against concurrent callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteGuard {
    /// Existence check and insert run as two separate store calls.
    CheckThenInsert,
    /// The store performs check and insert under one lock/transaction.
    Serialized,
}

/// Percentages of gross salary assigned to each fixed earning component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SalarySplit {
    pub basic: f64,
    pub hra: f64,
    pub da: f64,
    pub conveyance: f64,
    pub medical: f64,
}

impl Default for SalarySplit {
    fn default() -> Self {
        Self {
            basic: 0.50,
            hra: 0.20,
            da: 0.15,
            conveyance: 0.10,
            medical: 0.05,
        }
    }
}

impl FromStr for SalarySplit {
    type Err = anyhow::Error;

    /// Parses `"50/20/15/10/5"` (basic/HRA/DA/conveyance/medical).
    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split('/')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow!("invalid salary split {s:?}: {e}"))?;

        let [basic, hra, da, conveyance, medical] = parts[..] else {
            bail!("salary split {s:?} must have exactly five parts");
        };

        if parts.iter().any(|p| *p < 0.0) {
            bail!("salary split {s:?} has a negative part");
        }
        if (parts.iter().sum::<f64>() - 100.0).abs() > 1e-9 {
            bail!("salary split {s:?} must add up to 100");
        }

        Ok(Self {
            basic: basic / 100.0,
            hra: hra / 100.0,
            da: da / 100.0,
            conveyance: conveyance / 100.0,
            medical: medical / 100.0,
        })
    }
}

/// Thresholds and rates used by attendance classification and payroll.
#[derive(Clone, Debug, PartialEq)]
pub struct PayrollRules {
    pub standard_day_hours: f64,
    pub half_day_hours: f64,
    pub permission_cap_hours: f64,
    /// Fixed break deducted from every worked day, in minutes.
    pub break_minutes: f64,
    pub pf_rate: f64,
    pub esi_rate: f64,
    pub esi_gross_ceiling: f64,
    pub professional_tax: f64,
    pub professional_tax_floor: f64,
    pub overtime_multiplier: f64,
    pub split: SalarySplit,
}

impl Default for PayrollRules {
    fn default() -> Self {
        Self {
            standard_day_hours: 8.0,
            half_day_hours: 4.0,
            permission_cap_hours: 2.0,
            break_minutes: 0.0,
            pf_rate: 0.12,
            esi_rate: 0.0075,
            esi_gross_ceiling: 21_000.0,
            professional_tax: 200.0,
            professional_tax_floor: 10_000.0,
            overtime_multiplier: 1.5,
            split: SalarySplit::default(),
        }
    }
}

impl PayrollRules {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();

        let rules = Self {
            standard_day_hours: env_or("STANDARD_DAY_HOURS", d.standard_day_hours)?,
            half_day_hours: env_or("HALF_DAY_HOURS", d.half_day_hours)?,
            permission_cap_hours: env_or("PERMISSION_CAP_HOURS", d.permission_cap_hours)?,
            break_minutes: env_or("BREAK_MINUTES", d.break_minutes)?,
            pf_rate: env_or("PF_RATE", d.pf_rate)?,
            esi_rate: env_or("ESI_RATE", d.esi_rate)?,
            esi_gross_ceiling: env_or("ESI_GROSS_CEILING", d.esi_gross_ceiling)?,
            professional_tax: env_or("PROFESSIONAL_TAX", d.professional_tax)?,
            professional_tax_floor: env_or("PROFESSIONAL_TAX_FLOOR", d.professional_tax_floor)?,
            overtime_multiplier: env_or("OVERTIME_MULTIPLIER", d.overtime_multiplier)?,
            split: env_or("SALARY_SPLIT", d.split)?,
        };

        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<()> {
        if self.standard_day_hours <= 0.0 {
            bail!("STANDARD_DAY_HOURS must be positive");
        }
        if self.half_day_hours < 0.0 || self.half_day_hours > self.standard_day_hours {
            bail!("HALF_DAY_HOURS must be between 0 and STANDARD_DAY_HOURS");
        }
        let non_negative = [
            ("PERMISSION_CAP_HOURS", self.permission_cap_hours),
            ("BREAK_MINUTES", self.break_minutes),
            ("PF_RATE", self.pf_rate),
            ("ESI_RATE", self.esi_rate),
            ("ESI_GROSS_CEILING", self.esi_gross_ceiling),
            ("PROFESSIONAL_TAX", self.professional_tax),
            ("PROFESSIONAL_TAX_FLOOR", self.professional_tax_floor),
            ("OVERTIME_MULTIPLIER", self.overtime_multiplier),
        ];
        for (name, value) in non_negative {
            if value < 0.0 || !value.is_finite() {
                bail!("{name} must be a non-negative number");
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub run_migrations: bool,
    pub jwt_secret: String,
    pub log_level: tracing::Level,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub write_guard: WriteGuard,
    pub rules: PayrollRules,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "mysql".to_string())
            .to_lowercase()
            .as_str()
        {
            "mysql" => StoreBackend::MySql,
            "memory" => StoreBackend::Memory,
            other => bail!("unknown STORE_BACKEND {other:?} (expected mysql or memory)"),
        };

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::MySql && database_url.is_none() {
            bail!("DATABASE_URL must be set for the mysql backend");
        }

        let write_guard = match env::var("WRITE_GUARD")
            .unwrap_or_else(|_| "serialized".to_string())
            .to_lowercase()
            .as_str()
        {
            "serialized" => WriteGuard::Serialized,
            "check-then-insert" => WriteGuard::CheckThenInsert,
            other => bail!("unknown WRITE_GUARD {other:?}"),
        };

        let log_level = env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "debug".to_string())
            .parse::<tracing::Level>()
            .map_err(|e| anyhow!("invalid LOG_LEVEL: {e}"))?;

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            store_backend,
            database_url,
            run_migrations: env_or("RUN_MIGRATIONS", true)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            log_level,
            rate_protected_per_min: env_or("RATE_PROTECTED_PER_MIN", 1000)?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            write_guard,
            rules: PayrollRules::from_env()?,
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            server_addr: "127.0.0.1:0".into(),
            store_backend: StoreBackend::Memory,
            database_url: None,
            run_migrations: false,
            jwt_secret: jwt_secret.into(),
            log_level: tracing::Level::DEBUG,
            rate_protected_per_min: 1000,
            api_prefix: "/api".into(),
            write_guard: WriteGuard::Serialized,
            rules: PayrollRules::default(),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid value for {key}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_salary_split() {
        let split: SalarySplit = "50/20/15/10/5".parse().unwrap();
        assert_eq!(split, SalarySplit::default());
    }

    #[test]
    fn rejects_split_not_adding_to_hundred() {
        assert!("50/20/15/10/10".parse::<SalarySplit>().is_err());
        assert!("50/50".parse::<SalarySplit>().is_err());
        assert!("a/b/c/d/e".parse::<SalarySplit>().is_err());
    }

    #[test]
    fn default_rules_are_valid() {
        assert!(PayrollRules::default().validate().is_ok());
    }

    #[test]
    fn half_day_above_standard_is_rejected() {
        let rules = PayrollRules {
            half_day_hours: 9.0,
            ..PayrollRules::default()
        };
        assert!(rules.validate().is_err());
    }
}
