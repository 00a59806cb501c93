use super::domain::{MethodQuantities, TransactionKind, TransactionRecord, UserId};
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// First through last day of the month containing `reference`.
    pub fn month_of(reference: NaiveDate) -> Self {
        let start = first_day_of_month(reference);
        Self::new(start, last_day_of_month(start))
    }

    /// The reference month plus the two months before it.
    pub fn trailing_quarter(reference: NaiveDate) -> Self {
        let current = first_day_of_month(reference);
        let start = current
            .checked_sub_months(Months::new(2))
            .unwrap_or(NaiveDate::MIN);
        Self::new(start, last_day_of_month(current))
    }

    /// January 1st through the end of the reference month.
    pub fn year_to_date(reference: NaiveDate) -> Self {
        let current = first_day_of_month(reference);
        let start = NaiveDate::from_ymd_opt(reference.year(), 1, 1).unwrap_or(current);
        Self::new(start, last_day_of_month(current))
    }

    /// First day of every month that overlaps the range, in order.
    pub fn months(&self) -> Vec<NaiveDate> {
        let mut months = Vec::new();
        let mut cursor = first_day_of_month(self.start);
        while cursor <= self.end {
            months.push(cursor);
            match cursor.checked_add_months(Months::new(1)) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        months
    }
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    first_day_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

pub fn previous_month(date: NaiveDate) -> NaiveDate {
    first_day_of_month(date)
        .checked_sub_months(Months::new(1))
        .unwrap_or(NaiveDate::MIN)
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d").ok()
}

/// Whose records a query covers. Deciding who may ask for [`Scope::AllUsers`]
/// belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    User(UserId),
    AllUsers,
}

impl Scope {
    pub fn includes(&self, user: &UserId) -> bool {
        match self {
            Scope::User(id) => id == user,
            Scope::AllUsers => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DebtorTotals {
    pub resolved_amount: f64,
    pub paid_installments: u32,
}

/// Quantities and amounts for one range, ready for the calculators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub range: DateRange,
    pub registration: MethodQuantities,
    pub publication: MethodQuantities,
    pub debtor: DebtorTotals,
    pub record_count: usize,
}

impl PeriodSummary {
    fn empty(range: DateRange) -> Self {
        Self {
            range,
            registration: MethodQuantities::default(),
            publication: MethodQuantities::default(),
            debtor: DebtorTotals::default(),
            record_count: 0,
        }
    }

    fn absorb(&mut self, kind: &TransactionKind) {
        match kind {
            TransactionKind::Registration {
                payment_method,
                quantity,
            } => self.registration.add(*payment_method, *quantity),
            TransactionKind::Publication {
                payment_method,
                quantity,
            } => self.publication.add(*payment_method, *quantity),
            TransactionKind::Debtor {
                resolved_amount,
                paid_installments,
            } => {
                self.debtor.resolved_amount += resolved_amount;
                self.debtor.paid_installments =
                    self.debtor.paid_installments.saturating_add(*paid_installments);
            }
        }
        self.record_count += 1;
    }
}

/// Sums the records of `scope` dated inside `range`.
pub fn aggregate(records: &[TransactionRecord], range: DateRange, scope: &Scope) -> PeriodSummary {
    records
        .iter()
        .filter(|record| scope.includes(&record.user_id) && range.contains(record.date))
        .fold(PeriodSummary::empty(range), |mut summary, record| {
            summary.absorb(&record.kind);
            summary
        })
}

/// One summary per calendar month overlapping `range`, clipped to the range.
pub fn aggregate_by_month(
    records: &[TransactionRecord],
    range: DateRange,
    scope: &Scope,
) -> Vec<PeriodSummary> {
    let mut summaries: Vec<PeriodSummary> = range
        .months()
        .into_iter()
        .map(|month| {
            let start = month.max(range.start);
            let end = last_day_of_month(month).min(range.end);
            PeriodSummary::empty(DateRange::new(start, end))
        })
        .collect();

    for record in records {
        if !scope.includes(&record.user_id) || !range.contains(record.date) {
            continue;
        }
        let month = first_day_of_month(record.date);
        if let Some(summary) = summaries
            .iter_mut()
            .find(|summary| first_day_of_month(summary.range.start) == month)
        {
            summary.absorb(&record.kind);
        }
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn month_range_covers_first_to_last_day() {
        let range = DateRange::month_of(date(2024, 2, 17));
        assert_eq!(range.start, date(2024, 2, 1));
        assert_eq!(range.end, date(2024, 2, 29));

        let december = DateRange::month_of(date(2025, 12, 31));
        assert_eq!(december.end, date(2025, 12, 31));
    }

    #[test]
    fn quarter_and_year_ranges_cross_year_boundaries() {
        let quarter = DateRange::trailing_quarter(date(2025, 2, 10));
        assert_eq!(quarter.start, date(2024, 12, 1));
        assert_eq!(quarter.end, date(2025, 2, 28));

        let ytd = DateRange::year_to_date(date(2025, 4, 3));
        assert_eq!(ytd.start, date(2025, 1, 1));
        assert_eq!(ytd.end, date(2025, 4, 30));
    }

    #[test]
    fn previous_month_wraps_january() {
        assert_eq!(previous_month(date(2025, 1, 15)), date(2024, 12, 1));
        assert_eq!(previous_month(date(2025, 3, 31)), date(2025, 2, 1));
    }

    #[test]
    fn parse_month_accepts_year_month() {
        assert_eq!(parse_month("2025-07"), Some(date(2025, 7, 1)));
        assert_eq!(parse_month(" 2025-07 "), Some(date(2025, 7, 1)));
        assert_eq!(parse_month("2025-13"), None);
        assert_eq!(parse_month("july"), None);
    }

    #[test]
    fn months_lists_each_overlapping_month() {
        let range = DateRange::new(date(2025, 11, 20), date(2026, 1, 5));
        assert_eq!(
            range.months(),
            vec![date(2025, 11, 1), date(2025, 12, 1), date(2026, 1, 1)]
        );
    }
}
