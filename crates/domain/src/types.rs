// Copyright (C) 2026 AURLOM
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::invoice_status::InvoiceStatus;
use crate::line_status::LineStatus;
use std::str::FromStr;
use time::{Date, OffsetDateTime, Time};

/// Canonical numeric identifier of an invoice, assigned by the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvoiceId(i64);

impl InvoiceId {
    /// Creates an identifier from its raw database value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw database value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical numeric identifier of an invoice line, assigned by the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(i64);

impl LineId {
    /// Creates an identifier from its raw database value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw database value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a teacher in the external personnel directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeacherId(i64);

impl TeacherId {
    /// Creates an identifier from its raw directory value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw directory value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TeacherId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a campus in the external campus directory.
///
/// Campus scope is the authorization boundary for director write access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CampusId(i64);

impl CampusId {
    /// Creates an identifier from its raw directory value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw directory value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CampusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A calendar month period key (`YYYY-MM`).
///
/// One invoice exists per teacher per period; the import flow upserts
/// onto `(enseignant_id, month_year)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthYear {
    year: u16,
    month: u8,
}

impl MonthYear {
    /// Creates a period key from year and month values.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidMonthYear` if the month is not 1-12
    /// or the year is outside 2000-2100.
    pub fn new(year: u16, month: u8) -> Result<Self, DomainError> {
        if !(2000..=2100).contains(&year) || !(1..=12).contains(&month) {
            return Err(DomainError::InvalidMonthYear {
                value: format!("{year:04}-{month:02}"),
            });
        }
        Ok(Self { year, month })
    }

    /// Returns the year component.
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Parses a period key from its `YYYY-MM` representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidMonthYear` if the string is malformed.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidMonthYear {
            value: s.to_string(),
        };

        let (year_part, month_part) = s.split_once('-').ok_or_else(invalid)?;
        if year_part.len() != 4 || month_part.len() != 2 {
            return Err(invalid());
        }
        let year: u16 = year_part.parse().map_err(|_| invalid())?;
        let month: u8 = month_part.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl FromStr for MonthYear {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for MonthYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A monetary amount in euro cents.
///
/// All invariant-bearing arithmetic is integral; no floats enter the
/// workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Money(i64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from a raw cent value.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw cent value.
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Adds another amount.
    #[must_use]
    pub const fn plus(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }

    /// Parses a decimal euro string (`360`, `360.5`, `360.50`).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if the string is not a
    /// non-negative decimal with at most two fractional digits.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        parse_decimal_hundredths(s)
            .map(Self)
            .ok_or_else(|| DomainError::InvalidAmount {
                value: s.to_string(),
            })
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}

/// An hour quantity in hundredths of an hour (`150` = 1.50 h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hours(i64);

impl Hours {
    /// Creates a quantity from a raw hundredths value.
    #[must_use]
    pub const fn from_centiemes(centiemes: i64) -> Self {
        Self(centiemes)
    }

    /// Returns the raw hundredths value.
    #[must_use]
    pub const fn centiemes(&self) -> i64 {
        self.0
    }

    /// Computes the line total for this quantity at a unit rate.
    ///
    /// The product is rounded half-up to the cent.
    #[must_use]
    pub const fn total_at(self, prix_unitaire: Money) -> Money {
        Money::from_cents((self.0 * prix_unitaire.cents() + 50) / 100)
    }

    /// Parses a decimal hour string (`2`, `1.5`, `1.25`).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if the string is not a
    /// non-negative decimal with at most two fractional digits.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        parse_decimal_hundredths(s)
            .map(Self)
            .ok_or_else(|| DomainError::InvalidAmount {
                value: s.to_string(),
            })
    }
}

impl FromStr for Hours {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for Hours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}

/// Parses a non-negative decimal string into hundredths.
///
/// Accepts at most two fractional digits; a lone fraction (`.5`) or a
/// trailing separator (`3.`) is rejected.
fn parse_decimal_hundredths(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (whole_part, frac_part) = match s.split_once('.') {
        Some((w, fr)) => {
            if fr.is_empty() {
                return None;
            }
            (w, fr)
        }
        None => (s, ""),
    };
    if whole_part.is_empty() || frac_part.len() > 2 {
        return None;
    }
    if !whole_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !frac_part.is_empty() && !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = whole_part.parse().ok()?;
    let frac: i64 = match frac_part.len() {
        0 => 0,
        1 => frac_part.parse::<i64>().ok()? * 10,
        _ => frac_part.parse().ok()?,
    };
    whole.checked_mul(100)?.checked_add(frac)
}

/// One teacher's claimed hours for one calendar month at one campus.
///
/// `enseignant_id` and `campus_id` are immutable after creation.
/// `total_amount` is always the sum of the non-rejected lines' totals,
/// maintained by the aggregation rule with every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: InvoiceId,
    pub enseignant_id: TeacherId,
    pub campus_id: CampusId,
    pub month_year: MonthYear,
    pub status: InvoiceStatus,
    pub total_amount: Money,
    pub prevalidated_by: Option<String>,
    pub prevalidated_at: Option<OffsetDateTime>,
    pub validated_by: Option<String>,
    pub validated_at: Option<OffsetDateTime>,
    pub paid_by: Option<String>,
    pub payment_date: Option<Date>,
    pub created_at: OffsetDateTime,
}

impl Invoice {
    /// Creates a fresh pending invoice with no workflow stamps.
    #[must_use]
    pub const fn new(
        id: InvoiceId,
        enseignant_id: TeacherId,
        campus_id: CampusId,
        month_year: MonthYear,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            enseignant_id,
            campus_id,
            month_year,
            status: InvoiceStatus::Pending,
            total_amount: Money::ZERO,
            prevalidated_by: None,
            prevalidated_at: None,
            validated_by: None,
            validated_at: None,
            paid_by: None,
            payment_date: None,
            created_at,
        }
    }
}

/// One teaching session (prestation) within an invoice.
///
/// `invoice_id` is immutable; `total_ttc` always equals
/// `quantite_heures x prix_unitaire`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLine {
    pub id: LineId,
    pub invoice_id: InvoiceId,
    pub date_cours: Date,
    pub heure_debut: Time,
    pub heure_fin: Time,
    pub campus_id: CampusId,
    pub filiere: String,
    pub classe: String,
    pub intitule: String,
    /// Late-submission flag, informational only.
    pub retard: bool,
    pub quantite_heures: Hours,
    pub prix_unitaire: Money,
    pub total_ttc: Money,
    pub status: LineStatus,
    pub prevalidated_by: Option<String>,
    pub prevalidated_at: Option<OffsetDateTime>,
    pub observations: Option<String>,
}

impl InvoiceLine {
    /// Creates a pending line from a draft, computing its total.
    #[must_use]
    pub fn from_draft(id: LineId, invoice_id: InvoiceId, draft: &LineDraft) -> Self {
        Self {
            id,
            invoice_id,
            date_cours: draft.date_cours,
            heure_debut: draft.heure_debut,
            heure_fin: draft.heure_fin,
            campus_id: draft.campus_id,
            filiere: draft.filiere.clone(),
            classe: draft.classe.clone(),
            intitule: draft.intitule.clone(),
            retard: draft.retard,
            quantite_heures: draft.quantite_heures,
            prix_unitaire: draft.prix_unitaire,
            total_ttc: draft.quantite_heures.total_at(draft.prix_unitaire),
            status: LineStatus::Pending,
            prevalidated_by: None,
            prevalidated_at: None,
            observations: None,
        }
    }
}

/// Line data as submitted or imported, before persistence assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDraft {
    pub date_cours: Date,
    pub heure_debut: Time,
    pub heure_fin: Time,
    pub campus_id: CampusId,
    pub filiere: String,
    pub classe: String,
    pub intitule: String,
    pub retard: bool,
    pub quantite_heures: Hours,
    pub prix_unitaire: Money,
}
