//! Material ledger arithmetic.
//!
//! Pure functions behind warehouse inventory: stock sufficiency checks,
//! ledger line status changes and their stock effect, volumetric capacity,
//! replenishment sizing and low-stock classification. The repositories and
//! handlers supply the rows; nothing here touches the database.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::DbId;
use crate::workflow::{ProjectStatus, RESERVING_STATUSES};

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Pricing category of a material. Drives restock sizing and thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    /// Fixed cost line, not physical inventory.
    Labor,
    Materials,
    Gutter,
    InsulationVentilation,
    ScrewsHardware,
    Other,
}

impl MaterialCategory {
    /// Parse a free-text category label as entered in pricing configuration.
    ///
    /// Matching is case-insensitive. Unrecognised labels map to `Other`.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "labor" | "labour" => Self::Labor,
            "materials" | "material" => Self::Materials,
            "gutter" | "gutters" => Self::Gutter,
            "insulation" | "ventilation" | "insulation & ventilation"
            | "insulation/ventilation" | "insulation and ventilation" => {
                Self::InsulationVentilation
            }
            "screws" | "hardware" | "screws & hardware" | "screws/hardware"
            | "screws and hardware" => Self::ScrewsHardware,
            _ => Self::Other,
        }
    }

    /// Units added by one replenishment before the capacity clamp.
    pub fn restock_base(&self) -> i32 {
        match self {
            Self::Labor => 1,
            Self::Materials => 50,
            Self::Gutter => 25,
            Self::InsulationVentilation => 15,
            Self::ScrewsHardware => 150,
            Self::Other => 50,
        }
    }

    /// Low-stock thresholds, or `None` for categories the scan ignores.
    pub fn thresholds(&self) -> Option<StockThresholds> {
        match self {
            Self::Labor => None,
            Self::InsulationVentilation => Some(StockThresholds::new(5, 2)),
            Self::Gutter => Some(StockThresholds::new(15, 8)),
            Self::ScrewsHardware => Some(StockThresholds::new(20, 10)),
            Self::Materials | Self::Other => Some(StockThresholds::default()),
        }
    }
}

// ---------------------------------------------------------------------------
// Sufficiency
// ---------------------------------------------------------------------------

/// Largest quantity a single required-materials line may ask for.
pub const MAX_LINE_QUANTITY: i32 = 1_000_000;

/// One line of a required-materials list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RequiredMaterial {
    pub material_id: DbId,
    #[validate(range(min = 1, max = 1_000_000, message = "must be between 1 and 1000000"))]
    pub quantity: i32,
}

/// Current on-hand quantity of one material at the target warehouse.
#[derive(Debug, Clone, PartialEq)]
pub struct StockLevel {
    pub material_id: DbId,
    pub material_name: String,
    pub available: i32,
}

/// A material whose available stock is below the required quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialShortage {
    pub material_id: DbId,
    pub material_name: String,
    pub required: i32,
    pub available: i32,
    pub shortage: i32,
}

/// Sum duplicate lines of a required-materials list, keeping first-seen order.
///
/// Fails with `Validation` when a merged quantity exceeds `i32`.
pub fn merge_required(required: &[RequiredMaterial]) -> Result<Vec<RequiredMaterial>, CoreError> {
    let mut merged: Vec<RequiredMaterial> = Vec::with_capacity(required.len());
    for line in required {
        match merged.iter_mut().find(|m| m.material_id == line.material_id) {
            Some(existing) => {
                existing.quantity =
                    existing.quantity.checked_add(line.quantity).ok_or_else(|| {
                        CoreError::Validation(format!(
                            "materials: total quantity for material {} is too large",
                            line.material_id
                        ))
                    })?;
            }
            None => merged.push(*line),
        }
    }
    Ok(merged)
}

/// Compare a required-materials list against warehouse stock.
///
/// Returns one shortage per material with `available < required`. A material
/// the warehouse does not stock counts as zero available.
pub fn check_sufficiency(
    required: &[RequiredMaterial],
    stock: &[StockLevel],
) -> Result<Vec<MaterialShortage>, CoreError> {
    let by_id: HashMap<DbId, &StockLevel> = stock.iter().map(|s| (s.material_id, s)).collect();

    let shortages = merge_required(required)?
        .into_iter()
        .filter_map(|req| {
            let (name, available) = match by_id.get(&req.material_id) {
                Some(level) => (level.material_name.clone(), level.available),
                None => (format!("Material {}", req.material_id), 0),
            };
            (available < req.quantity).then(|| MaterialShortage {
                material_id: req.material_id,
                material_name: name,
                required: req.quantity,
                available,
                shortage: req.quantity - available,
            })
        })
        .collect();
    Ok(shortages)
}

/// Like [`check_sufficiency`] but fails with `InsufficientMaterials`.
pub fn ensure_sufficient(
    required: &[RequiredMaterial],
    stock: &[StockLevel],
) -> Result<(), CoreError> {
    let shortages = check_sufficiency(required, stock)?;
    if shortages.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InsufficientMaterials(shortages))
    }
}

// ---------------------------------------------------------------------------
// Ledger line status
// ---------------------------------------------------------------------------

/// Status of a project material ledger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineStatus {
    Reserved,
    Consumed,
    Returned,
}

impl LineStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "RESERVED" => Ok(Self::Reserved),
            "CONSUMED" => Ok(Self::Consumed),
            "RETURNED" => Ok(Self::Returned),
            _ => Err(CoreError::Validation(format!(
                "Invalid ledger line status '{s}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reserved => "RESERVED",
            Self::Consumed => "CONSUMED",
            Self::Returned => "RETURNED",
        }
    }
}

/// Change to `warehouse_materials.quantity` caused by moving a ledger line
/// of `quantity` units from `from` to `to`.
///
/// Reservation never touched stock, so releasing a reserved line is a no-op
/// on stock while returning a consumed line puts the units back.
pub fn stock_delta(from: LineStatus, to: LineStatus, quantity: i32) -> Result<i32, CoreError> {
    match (from, to) {
        (LineStatus::Reserved, LineStatus::Consumed) => Ok(-quantity),
        (LineStatus::Consumed, LineStatus::Returned) => Ok(quantity),
        (LineStatus::Reserved, LineStatus::Returned) => Ok(0),
        _ => Err(CoreError::Conflict(format!(
            "Cannot move ledger line from {} to {}",
            from.as_str(),
            to.as_str()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Capacity and replenishment
// ---------------------------------------------------------------------------

/// Share of the remaining warehouse volume a single replenishment may fill.
pub const REPLENISH_CAPACITY_SHARE: f64 = 0.5;

/// Volume of one unit, or `0.0` when any dimension is missing.
pub fn unit_volume(length: Option<f64>, width: Option<f64>, height: Option<f64>) -> f64 {
    match (length, width, height) {
        (Some(l), Some(w), Some(h)) if l > 0.0 && w > 0.0 && h > 0.0 => l * w * h,
        _ => 0.0,
    }
}

/// Volumetric usage of a warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapacityUsage {
    pub capacity: f64,
    pub used: f64,
    pub remaining: f64,
    pub percent_used: f64,
}

/// Compute usage from `(quantity, unit_volume)` pairs of active materials.
pub fn capacity_usage<I>(capacity: f64, lines: I) -> CapacityUsage
where
    I: IntoIterator<Item = (i32, f64)>,
{
    let used: f64 = lines
        .into_iter()
        .map(|(quantity, volume)| f64::from(quantity.max(0)) * volume)
        .sum();
    let remaining = (capacity - used).max(0.0);
    let percent_used = if capacity > 0.0 {
        used / capacity * 100.0
    } else {
        0.0
    };
    CapacityUsage {
        capacity,
        used,
        remaining,
        percent_used,
    }
}

/// Suggested restock quantity for one material.
///
/// Starts from the category base and clamps so the added volume never
/// exceeds [`REPLENISH_CAPACITY_SHARE`] of the remaining capacity.
/// Materials without a volume are not clamped.
pub fn replenish_quantity(
    category: MaterialCategory,
    unit_volume: f64,
    usage: &CapacityUsage,
) -> i32 {
    let base = category.restock_base();
    if unit_volume <= 0.0 {
        return base;
    }
    let budget = usage.remaining * REPLENISH_CAPACITY_SHARE;
    let max_units = (budget / unit_volume).floor();
    if max_units < f64::from(base) {
        max_units.max(0.0) as i32
    } else {
        base
    }
}

// ---------------------------------------------------------------------------
// Low-stock scan
// ---------------------------------------------------------------------------

/// Warning and critical stock levels for a category (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockThresholds {
    pub warning: i32,
    pub critical: i32,
}

impl StockThresholds {
    pub const fn new(warning: i32, critical: i32) -> Self {
        Self { warning, critical }
    }

    pub fn classify(&self, current: i32) -> Option<StockSeverity> {
        if current <= self.critical {
            Some(StockSeverity::Critical)
        } else if current <= self.warning {
            Some(StockSeverity::Warning)
        } else {
            None
        }
    }
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self::new(10, 5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockSeverity {
    Critical,
    Warning,
}

/// One active warehouse material as seen by the scan.
#[derive(Debug, Clone, PartialEq)]
pub struct StockLine {
    pub warehouse_material_id: DbId,
    pub warehouse_id: DbId,
    pub warehouse_name: String,
    pub material_id: DbId,
    pub material_name: String,
    pub category: String,
    pub quantity: i32,
}

/// A reserved ledger line together with its project's current status.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectReservation {
    pub warehouse_material_id: DbId,
    pub project_id: DbId,
    pub project_name: String,
    pub project_status: ProjectStatus,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsumingProject {
    pub project_id: DbId,
    pub project_name: String,
    pub status: ProjectStatus,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockWarning {
    pub warehouse_id: DbId,
    pub warehouse_name: String,
    pub material_id: DbId,
    pub material_name: String,
    pub category: String,
    pub severity: StockSeverity,
    pub current_stock: i32,
    pub warning_threshold: i32,
    pub critical_threshold: i32,
    pub reserved_for_projects: i64,
    pub projected_stock: i64,
    pub projects: Vec<ConsumingProject>,
}

/// Run the low-stock scan over every active warehouse material.
///
/// Labor lines are skipped. Reserved quantities only count for projects in
/// [`RESERVING_STATUSES`]. Results are ordered critical first, then by
/// ascending current stock.
pub fn scan_low_stock(
    lines: &[StockLine],
    reservations: &[ProjectReservation],
) -> Vec<StockWarning> {
    let mut by_line: HashMap<DbId, Vec<&ProjectReservation>> = HashMap::new();
    for r in reservations
        .iter()
        .filter(|r| RESERVING_STATUSES.contains(&r.project_status))
    {
        by_line.entry(r.warehouse_material_id).or_default().push(r);
    }

    let mut warnings: Vec<StockWarning> = lines
        .iter()
        .filter_map(|line| {
            let thresholds = MaterialCategory::from_label(&line.category).thresholds()?;
            let severity = thresholds.classify(line.quantity)?;

            let consumers = by_line
                .get(&line.warehouse_material_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let reserved: i64 = consumers.iter().map(|r| i64::from(r.quantity)).sum();

            Some(StockWarning {
                warehouse_id: line.warehouse_id,
                warehouse_name: line.warehouse_name.clone(),
                material_id: line.material_id,
                material_name: line.material_name.clone(),
                category: line.category.clone(),
                severity,
                current_stock: line.quantity,
                warning_threshold: thresholds.warning,
                critical_threshold: thresholds.critical,
                reserved_for_projects: reserved,
                projected_stock: i64::from(line.quantity) - reserved,
                projects: consumers
                    .iter()
                    .map(|r| ConsumingProject {
                        project_id: r.project_id,
                        project_name: r.project_name.clone(),
                        status: r.project_status,
                        quantity: r.quantity,
                    })
                    .collect(),
            })
        })
        .collect();

    warnings.sort_by_key(|w| (w.severity, w.current_stock));
    warnings
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn level(id: DbId, name: &str, available: i32) -> StockLevel {
        StockLevel {
            material_id: id,
            material_name: name.to_string(),
            available,
        }
    }

    fn req(id: DbId, quantity: i32) -> RequiredMaterial {
        RequiredMaterial {
            material_id: id,
            quantity,
        }
    }

    fn line(id: DbId, category: &str, quantity: i32) -> StockLine {
        StockLine {
            warehouse_material_id: id,
            warehouse_id: 1,
            warehouse_name: "North Yard".to_string(),
            material_id: id * 100,
            material_name: format!("Material {id}"),
            category: category.to_string(),
            quantity,
        }
    }

    fn reservation(
        line_id: DbId,
        project_id: DbId,
        status: ProjectStatus,
        quantity: i32,
    ) -> ProjectReservation {
        ProjectReservation {
            warehouse_material_id: line_id,
            project_id,
            project_name: format!("Project {project_id}"),
            project_status: status,
            quantity,
        }
    }

    // -- categories ---------------------------------------------------------

    #[test]
    fn category_labels_parse_case_insensitively() {
        assert_eq!(MaterialCategory::from_label("Labor"), MaterialCategory::Labor);
        assert_eq!(MaterialCategory::from_label(" GUTTER "), MaterialCategory::Gutter);
        assert_eq!(
            MaterialCategory::from_label("Insulation & Ventilation"),
            MaterialCategory::InsulationVentilation
        );
        assert_eq!(
            MaterialCategory::from_label("screws/hardware"),
            MaterialCategory::ScrewsHardware
        );
        assert_eq!(MaterialCategory::from_label("Skylights"), MaterialCategory::Other);
    }

    #[test]
    fn restock_bases_match_category_table() {
        assert_eq!(MaterialCategory::Labor.restock_base(), 1);
        assert_eq!(MaterialCategory::Materials.restock_base(), 50);
        assert_eq!(MaterialCategory::Gutter.restock_base(), 25);
        assert_eq!(MaterialCategory::InsulationVentilation.restock_base(), 15);
        assert_eq!(MaterialCategory::ScrewsHardware.restock_base(), 150);
    }

    #[test]
    fn thresholds_match_category_table() {
        assert_eq!(MaterialCategory::Materials.thresholds(), Some(StockThresholds::new(10, 5)));
        assert_eq!(
            MaterialCategory::InsulationVentilation.thresholds(),
            Some(StockThresholds::new(5, 2))
        );
        assert_eq!(MaterialCategory::Gutter.thresholds(), Some(StockThresholds::new(15, 8)));
        assert_eq!(
            MaterialCategory::ScrewsHardware.thresholds(),
            Some(StockThresholds::new(20, 10))
        );
        assert_eq!(MaterialCategory::Labor.thresholds(), None);
    }

    // -- sufficiency --------------------------------------------------------

    #[test]
    fn reports_only_short_materials() {
        let required = [req(1, 10), req(2, 5)];
        let stock = [level(1, "Shingles", 8), level(2, "Underlayment", 5)];

        let shortages = check_sufficiency(&required, &stock).unwrap();
        assert_eq!(
            shortages,
            vec![MaterialShortage {
                material_id: 1,
                material_name: "Shingles".to_string(),
                required: 10,
                available: 8,
                shortage: 2,
            }]
        );
    }

    #[test]
    fn unstocked_material_counts_as_zero() {
        let shortages = check_sufficiency(&[req(7, 3)], &[]).unwrap();
        assert_eq!(shortages.len(), 1);
        assert_eq!(shortages[0].available, 0);
        assert_eq!(shortages[0].shortage, 3);
    }

    #[test]
    fn duplicate_requirements_are_summed() {
        let merged = merge_required(&[req(1, 4), req(2, 1), req(1, 6)]).unwrap();
        assert_eq!(merged, vec![req(1, 10), req(2, 1)]);

        let shortages =
            check_sufficiency(&[req(1, 4), req(1, 6)], &[level(1, "Shingles", 9)]).unwrap();
        assert_eq!(shortages[0].shortage, 1);
    }

    #[test]
    fn merged_quantity_overflow_is_rejected() {
        let half = i32::MAX / 2 + 1;
        let err = merge_required(&[req(1, half), req(1, half)]).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg.contains("material 1"));

        let err = check_sufficiency(&[req(1, i32::MAX), req(1, 1)], &[]).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn line_quantity_is_bounded() {
        assert!(crate::validation::validate_input(&req(1, MAX_LINE_QUANTITY)).is_ok());
        assert!(crate::validation::validate_input(&req(1, MAX_LINE_QUANTITY + 1)).is_err());
        assert!(crate::validation::validate_input(&req(1, 0)).is_err());
    }

    #[test]
    fn ensure_sufficient_carries_shortages() {
        let err = ensure_sufficient(&[req(1, 2)], &[level(1, "Flashing", 1)]).unwrap_err();
        assert_matches!(err, CoreError::InsufficientMaterials(ref s) if s.len() == 1);
        assert!(ensure_sufficient(&[req(1, 1)], &[level(1, "Flashing", 1)]).is_ok());
    }

    #[test]
    fn concurrent_acceptances_both_pass_against_same_stock() {
        // Reservation does not decrement stock, so two projects checked
        // against the same snapshot both pass even though only one fits.
        let stock = [level(1, "Ridge cap", 10)];
        let first = check_sufficiency(&[req(1, 10)], &stock).unwrap();
        let second = check_sufficiency(&[req(1, 10)], &stock).unwrap();
        assert!(first.is_empty());
        assert!(second.is_empty());
    }

    // -- ledger -------------------------------------------------------------

    #[test]
    fn line_status_strings_round_trip() {
        for s in [LineStatus::Reserved, LineStatus::Consumed, LineStatus::Returned] {
            assert_eq!(LineStatus::from_str_db(s.as_str()).unwrap(), s);
        }
        assert!(LineStatus::from_str_db("reserved").is_err());
    }

    #[test]
    fn reserve_consume_return_restores_stock() {
        let initial = 40;
        let q = 12;
        let mut stock = initial;
        let mut history = vec![LineStatus::Reserved];

        for next in [LineStatus::Consumed, LineStatus::Returned] {
            let current = *history.last().unwrap();
            stock += stock_delta(current, next, q).unwrap();
            assert!(stock >= 0);
            history.push(next);
        }

        assert_eq!(stock, initial);
        assert_eq!(
            history,
            vec![LineStatus::Reserved, LineStatus::Consumed, LineStatus::Returned]
        );
    }

    #[test]
    fn releasing_reservation_leaves_stock_untouched() {
        assert_eq!(stock_delta(LineStatus::Reserved, LineStatus::Returned, 9).unwrap(), 0);
    }

    #[test]
    fn illegal_line_moves_conflict() {
        assert_matches!(
            stock_delta(LineStatus::Returned, LineStatus::Consumed, 1),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            stock_delta(LineStatus::Consumed, LineStatus::Reserved, 1),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            stock_delta(LineStatus::Returned, LineStatus::Returned, 1),
            Err(CoreError::Conflict(_))
        );
    }

    // -- capacity and replenishment -----------------------------------------

    #[test]
    fn unit_volume_requires_all_dimensions() {
        assert_eq!(unit_volume(Some(2.0), Some(3.0), Some(4.0)), 24.0);
        assert_eq!(unit_volume(Some(2.0), None, Some(4.0)), 0.0);
        assert_eq!(unit_volume(Some(2.0), Some(0.0), Some(4.0)), 0.0);
    }

    #[test]
    fn capacity_usage_sums_line_volumes() {
        let usage = capacity_usage(1000.0, [(10, 5.0), (4, 25.0)]);
        assert_eq!(usage.used, 150.0);
        assert_eq!(usage.remaining, 850.0);
        assert!((usage.percent_used - 15.0).abs() < 1e-9);
    }

    #[test]
    fn over_full_warehouse_has_no_remaining_capacity() {
        let usage = capacity_usage(100.0, [(30, 5.0)]);
        assert_eq!(usage.remaining, 0.0);
        assert_eq!(replenish_quantity(MaterialCategory::Materials, 1.0, &usage), 0);
    }

    #[test]
    fn replenishment_uses_base_when_space_allows() {
        let usage = capacity_usage(100_000.0, [(0, 1.0)]);
        assert_eq!(replenish_quantity(MaterialCategory::Gutter, 2.0, &usage), 25);
    }

    #[test]
    fn replenishment_clamped_to_half_remaining_capacity() {
        // remaining 1000, budget 500, unit volume 20 -> at most 25 units.
        let usage = capacity_usage(1000.0, std::iter::empty());
        assert_eq!(replenish_quantity(MaterialCategory::Materials, 20.0, &usage), 25);
    }

    #[test]
    fn replenishment_never_exceeds_half_remaining_capacity() {
        let categories = [
            MaterialCategory::Labor,
            MaterialCategory::Materials,
            MaterialCategory::Gutter,
            MaterialCategory::InsulationVentilation,
            MaterialCategory::ScrewsHardware,
            MaterialCategory::Other,
        ];
        for capacity in [0.0, 10.0, 333.0, 1000.0, 25_000.0] {
            for used_units in [0, 3, 40] {
                for volume in [0.5, 1.0, 7.5, 40.0] {
                    let usage = capacity_usage(capacity, [(used_units, volume)]);
                    for category in categories {
                        let qty = replenish_quantity(category, volume, &usage);
                        assert!(qty >= 0);
                        assert!(
                            f64::from(qty) * volume <= usage.remaining * REPLENISH_CAPACITY_SHARE,
                            "{category:?} cap={capacity} vol={volume} qty={qty}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn volumeless_material_gets_base_quantity() {
        let usage = capacity_usage(0.0, std::iter::empty());
        assert_eq!(replenish_quantity(MaterialCategory::Labor, 0.0, &usage), 1);
    }

    // -- low-stock scan -----------------------------------------------------

    #[test]
    fn thresholds_are_inclusive() {
        let t = StockThresholds::new(10, 5);
        assert_eq!(t.classify(5), Some(StockSeverity::Critical));
        assert_eq!(t.classify(6), Some(StockSeverity::Warning));
        assert_eq!(t.classify(10), Some(StockSeverity::Warning));
        assert_eq!(t.classify(11), None);
    }

    #[test]
    fn labor_is_never_reported() {
        let lines = [line(1, "Labor", 0), line(2, "labor", 3)];
        assert!(scan_low_stock(&lines, &[]).is_empty());
    }

    #[test]
    fn insulation_at_three_is_a_warning_not_critical() {
        let lines = [line(1, "Insulation & Ventilation", 3)];
        let warnings = scan_low_stock(&lines, &[]);
        assert_eq!(warnings.len(), 1);
        let w = &warnings[0];
        assert_eq!(w.severity, StockSeverity::Warning);
        assert_eq!(w.current_stock, 3);
        assert_eq!(w.warning_threshold, 5);
        assert_eq!(w.critical_threshold, 2);
    }

    #[test]
    fn reserved_quantity_counts_only_active_projects() {
        let lines = [line(1, "Materials", 8)];
        let reservations = [
            reservation(1, 10, ProjectStatus::Accepted, 3),
            reservation(1, 11, ProjectStatus::InProgress, 2),
            reservation(1, 12, ProjectStatus::Completed, 50),
            reservation(1, 13, ProjectStatus::Archived, 50),
            reservation(2, 14, ProjectStatus::Accepted, 99),
        ];

        let warnings = scan_low_stock(&lines, &reservations);
        assert_eq!(warnings.len(), 1);
        let w = &warnings[0];
        assert_eq!(w.reserved_for_projects, 5);
        assert_eq!(w.projected_stock, 3);
        let ids: Vec<DbId> = w.projects.iter().map(|p| p.project_id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn healthy_stock_is_not_reported_even_with_reservations() {
        let lines = [line(1, "Gutter", 40)];
        let reservations = [reservation(1, 10, ProjectStatus::Accepted, 39)];
        assert!(scan_low_stock(&lines, &reservations).is_empty());
    }

    #[test]
    fn critical_warnings_sort_first() {
        let lines = [
            line(1, "Materials", 9),
            line(2, "Screws & Hardware", 4),
            line(3, "Gutter", 8),
        ];
        let warnings = scan_low_stock(&lines, &[]);
        let order: Vec<(StockSeverity, i32)> =
            warnings.iter().map(|w| (w.severity, w.current_stock)).collect();
        assert_eq!(
            order,
            vec![
                (StockSeverity::Critical, 4),
                (StockSeverity::Critical, 8),
                (StockSeverity::Warning, 9),
            ]
        );
    }
}
