//! Employee records as delivered by the HR store, and the keys derived from them.

use std::fmt;
use std::sync::OnceLock;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Marker value of `employment_type` for an unfilled requisition.
pub const HEADCOUNT_OPEN: &str = "hc_open";

/// Prefix applied to the manager part of a department key for dotted-line reports.
pub const INDIRECT_PREFIX: &str = "i-";

/// One HR row.
///
/// Field names accept both the canonical camelCase form and the column
/// headers of the HR spreadsheet export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeRecord {
    #[serde(alias = "emp_id", alias = "Emp ID", deserialize_with = "lenient_string")]
    pub employee_id: String,
    #[serde(
        alias = "full_name",
        alias = "FullName",
        alias = "FullName ",
        alias = "Full Name",
        deserialize_with = "lenient_string"
    )]
    pub full_name: String,
    #[serde(alias = "job_title", alias = "Job Title", deserialize_with = "lenient_string")]
    pub job_title: String,
    #[serde(alias = "dept", alias = "Dept", deserialize_with = "lenient_string")]
    pub department: String,
    #[serde(alias = "bu", alias = "BU", deserialize_with = "lenient_string")]
    pub business_unit: String,
    #[serde(
        alias = "bu_org_3",
        alias = "BU Org 3",
        deserialize_with = "lenient_string"
    )]
    pub business_unit_detail: String,
    #[serde(
        alias = "dl_idl_staff",
        alias = "DL/IDL/Staff",
        deserialize_with = "lenient_string"
    )]
    pub employment_category: String,
    #[serde(alias = "Location", deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(
        alias = "employee_type",
        alias = "Employee Type",
        deserialize_with = "lenient_string"
    )]
    pub employment_type: String,
    #[serde(
        alias = "line_manager",
        alias = "Line Manager",
        deserialize_with = "lenient_string"
    )]
    pub line_manager_raw: String,
    #[serde(alias = "is_direct", alias = "Is Direct")]
    pub is_direct_report: DirectReport,
    #[serde(
        alias = "joining_date",
        alias = "Joining Date",
        deserialize_with = "lenient_opt_string"
    )]
    pub joining_date: Option<String>,
    #[serde(
        alias = "last_working_day",
        alias = "Last Working Day",
        alias = "LWD",
        alias = "Resignation Date",
        deserialize_with = "lenient_opt_string"
    )]
    pub last_working_day: Option<String>,
}

impl EmployeeRecord {
    /// Trimmed employee id, `None` when blank.
    pub fn id(&self) -> Option<&str> {
        let id = self.employee_id.trim();
        (!id.is_empty()).then_some(id)
    }

    pub fn manager_key(&self) -> Option<ManagerKey> {
        ManagerKey::parse(&self.line_manager_raw)
    }

    pub fn is_headcount_open(&self) -> bool {
        self.employment_type.trim() == HEADCOUNT_OPEN
    }

    pub fn joining(&self) -> Option<NaiveDate> {
        self.joining_date.as_deref().and_then(parse_hr_date)
    }

    pub fn leaving(&self) -> Option<NaiveDate> {
        self.last_working_day.as_deref().and_then(parse_hr_date)
    }
}

/// Tri-state "reports directly" flag. Only an explicit "no" makes a report indirect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DirectReport {
    Yes,
    No,
    #[default]
    Unspecified,
}

impl DirectReport {
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("no") {
            DirectReport::No
        } else if value.eq_ignore_ascii_case("yes") {
            DirectReport::Yes
        } else {
            DirectReport::Unspecified
        }
    }

    pub fn is_indirect(self) -> bool {
        self == DirectReport::No
    }
}

impl Serialize for DirectReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DirectReport::Yes => serializer.serialize_str("YES"),
            DirectReport::No => serializer.serialize_str("NO"),
            DirectReport::Unspecified => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for DirectReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient_opt_string(deserializer)?;
        Ok(raw.as_deref().map(DirectReport::parse).unwrap_or_default())
    }
}

/// Normalized identity of a line-manager reference.
///
/// `"00042: Alice"`, `"42: Alice"` and `"42"` all normalize to `"42"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ManagerKey(String);

impl ManagerKey {
    /// Returns `None` for an empty or all-zero reference (no manager).
    pub fn parse(raw: &str) -> Option<Self> {
        let id_part = raw.split(':').next().unwrap_or_default().trim();
        let stripped = id_part.trim_start_matches('0');
        if stripped.is_empty() {
            None
        } else {
            Some(Self(stripped.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ManagerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one synthetic department container: department plus
/// effective manager (prefixed for indirect reports).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DepartmentGroupKey {
    pub department: String,
    pub manager: Option<ManagerKey>,
    pub indirect: bool,
}

impl DepartmentGroupKey {
    pub fn new(department: &str, manager: Option<ManagerKey>, direct: DirectReport) -> Self {
        // Without a manager there is nothing to report indirectly to.
        let indirect = manager.is_some() && direct.is_indirect();
        Self {
            department: department.to_string(),
            manager,
            indirect,
        }
    }

    /// `"42"`, `"i-42"`, or `None` for a manager-less group.
    pub fn effective_manager_id(&self) -> Option<String> {
        self.manager.as_ref().map(|m| {
            if self.indirect {
                format!("{}{}", INDIRECT_PREFIX, m)
            } else {
                m.to_string()
            }
        })
    }

    /// Stable node id: `dept:<department>:<effectiveManagerId>`.
    pub fn node_id(&self) -> String {
        format!(
            "dept:{}:{}",
            self.department,
            self.effective_manager_id().unwrap_or_default()
        )
    }
}

/// Department filter applied to the record set before building.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum DepartmentFilter {
    #[default]
    All,
    Department(String),
}

impl DepartmentFilter {
    /// `None`, empty and `"all"` select everything.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            None | Some("") | Some("all") => DepartmentFilter::All,
            Some(dept) => DepartmentFilter::Department(dept.to_string()),
        }
    }

    pub fn matches(&self, record: &EmployeeRecord) -> bool {
        match self {
            DepartmentFilter::All => true,
            DepartmentFilter::Department(dept) => record.department == *dept,
        }
    }

    pub fn cache_key(&self) -> String {
        match self {
            DepartmentFilter::All => "orgchart:all".to_string(),
            DepartmentFilter::Department(dept) => format!("orgchart:dept:{}", dept),
        }
    }
}

impl fmt::Display for DepartmentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepartmentFilter::All => f.write_str("all"),
            DepartmentFilter::Department(dept) => f.write_str(dept),
        }
    }
}

// ============================================================
// Dates
// ============================================================

fn excel_serial_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)?$").unwrap())
}

/// Parse an HR date cell.
///
/// Accepts `YYYY-MM-DD` (optionally followed by a time part), `DD/MM/YYYY`,
/// and Excel serial day numbers (epoch 1899-12-30).
pub fn parse_hr_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if excel_serial_regex().is_match(value) {
        let serial = value.parse::<f64>().ok()?;
        if serial < 1.0 {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        return epoch.checked_add_signed(Duration::days(serial.trunc() as i64));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Some((date_part, _)) = value.split_once('T') {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Some(date);
        }
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    NaiveDate::parse_from_str(value, "%d/%m/%Y").ok()
}

/// Display form used on chart nodes.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Closed interval: joined between `window_days` days ago and today.
pub fn is_probation(joining: NaiveDate, today: NaiveDate, window_days: i64) -> bool {
    let elapsed = (today - joining).num_days();
    (0..=window_days).contains(&elapsed)
}

// ============================================================
// Lenient cell decoding
// ============================================================

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Some(i.to_string())),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => {
                Ok(Some(format!("{}", f as i64)))
            }
            _ => Ok(Some(n.to_string())),
        },
        Some(other) => Err(de::Error::custom(format!(
            "expected a text or number cell, got {}",
            other
        ))),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_key_strips_name_and_leading_zeros() {
        assert_eq!(ManagerKey::parse("00042: Alice").unwrap().as_str(), "42");
        assert_eq!(ManagerKey::parse(" 42 ").unwrap().as_str(), "42");
        assert_eq!(ManagerKey::parse("000"), None);
        assert_eq!(ManagerKey::parse(": Nobody"), None);
    }

    #[test]
    fn group_key_prefixes_indirect_manager() {
        let key = DepartmentGroupKey::new("Eng", ManagerKey::parse("7"), DirectReport::No);
        assert_eq!(key.node_id(), "dept:Eng:i-7");

        let rootless = DepartmentGroupKey::new("Eng", None, DirectReport::No);
        assert!(!rootless.indirect);
        assert_eq!(rootless.node_id(), "dept:Eng:");
    }

    #[test]
    fn hr_dates_in_all_supported_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_hr_date("2024-03-05"), Some(expected));
        assert_eq!(parse_hr_date("2024-03-05T08:00:00.000Z"), Some(expected));
        assert_eq!(parse_hr_date("05/03/2024"), Some(expected));
        assert_eq!(parse_hr_date("45356"), Some(expected));
        assert_eq!(parse_hr_date("soon"), None);
        assert_eq!(parse_hr_date(""), None);
    }

    #[test]
    fn record_decodes_spreadsheet_headers_and_numeric_cells() {
        let json = r#"{
            "Emp ID": 123,
            "FullName": "Jane Doe",
            "Dept": "Eng",
            "Line Manager": "0007: Boss",
            "Is Direct": "no",
            "Joining Date": 45356
        }"#;
        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.employee_id, "123");
        assert_eq!(record.full_name, "Jane Doe");
        assert_eq!(record.manager_key().unwrap().as_str(), "7");
        assert_eq!(record.is_direct_report, DirectReport::No);
        assert_eq!(record.joining_date.as_deref(), Some("45356"));
    }

    #[test]
    fn department_filter_treats_all_as_everything() {
        assert_eq!(DepartmentFilter::from_param(Some("all")), DepartmentFilter::All);
        assert_eq!(DepartmentFilter::from_param(None), DepartmentFilter::All);
        assert_eq!(
            DepartmentFilter::from_param(Some("Eng")).cache_key(),
            "orgchart:dept:Eng"
        );
    }
}
