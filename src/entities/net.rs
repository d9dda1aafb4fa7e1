//! Per-NET result rows

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::limits::LimitResult;
use crate::core::stats::StatisticsResult;
use crate::core::vendor::{VendorSpecEntry, VendorSpecs};
use crate::sheet::CellValue;

/// Identity fields of one measurement point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetIdentity {
    /// 0-based NET index
    pub index: usize,
    /// "No" column of the reference sheet (the 1-based index when blank)
    pub no: CellValue,
    pub net_name: CellValue,
    pub btob_name: CellValue,
    pub btob_pin: CellValue,
    pub acf_name: CellValue,
    pub acf_pin: CellValue,
    /// PinA / PinB recorded on the grid for this NET
    pub pin_a: CellValue,
    pub pin_b: CellValue,
}

impl NetIdentity {
    /// 1-based NET number
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Vendor lookup key built from the BtoB and ACF pins
    pub fn vendor_key(&self) -> Option<String> {
        VendorSpecs::composite_key(&self.btob_name, &self.btob_pin, &self.acf_name, &self.acf_pin)
    }
}

/// Pass/fail of a computed limit against the vendor bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Judgement {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "NG")]
    Ng,
    /// No vendor bound or no computed limit
    #[default]
    #[serde(rename = "")]
    CannotJudge,
}

impl Judgement {
    /// NG when the internal LSL sits below the vendor LSL
    pub fn lower(internal_lsl: Option<i64>, vendor_lsl: Option<f64>) -> Self {
        match (internal_lsl, vendor_lsl) {
            (Some(internal), Some(vendor)) if (internal as f64) < vendor => Judgement::Ng,
            (Some(_), Some(_)) => Judgement::Ok,
            _ => Judgement::CannotJudge,
        }
    }

    /// NG when the internal USL sits above the vendor USL
    pub fn upper(internal_usl: Option<i64>, vendor_usl: Option<f64>) -> Self {
        match (internal_usl, vendor_usl) {
            (Some(internal), Some(vendor)) if (internal as f64) > vendor => Judgement::Ng,
            (Some(_), Some(_)) => Judgement::Ok,
            _ => Judgement::CannotJudge,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Judgement::Ok => "OK",
            Judgement::Ng => "NG",
            Judgement::CannotJudge => "",
        }
    }
}

impl fmt::Display for Judgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics of one NET, in NET order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetStatistics {
    pub net: usize,
    #[serde(flatten)]
    pub stats: StatisticsResult,
}

/// One output row per NET
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub identity: NetIdentity,
    pub vendor: VendorSpecEntry,
    /// `None` when the NET had no samples
    pub limits: Option<LimitResult>,
    pub judgement_lsl: Judgement,
    pub judgement_usl: Judgement,
}

impl ResultRow {
    pub fn new(
        identity: NetIdentity,
        vendor: VendorSpecEntry,
        limits: Option<LimitResult>,
    ) -> Self {
        let judgement_lsl = Judgement::lower(limits.map(|l| l.internal_lsl), vendor.lsl);
        let judgement_usl = Judgement::upper(limits.map(|l| l.internal_usl), vendor.usl);
        Self {
            identity,
            vendor,
            limits,
            judgement_lsl,
            judgement_usl,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.limits.is_some_and(|l| l.sentinel)
    }

    /// Flatten into the column order of the "Calculate USL LSL" sheet
    pub fn to_record(&self) -> ResultRecord {
        let id = &self.identity;
        let l = self.limits;
        ResultRecord {
            no: id.no.render(),
            net_name: id.net_name.render(),
            btob_name: id.btob_name.render(),
            btob_pin: id.btob_pin.render(),
            acf_name: id.acf_name.render(),
            acf_pin: id.acf_pin.render(),
            pin_a: id.pin_a.render(),
            pin_b: id.pin_b.render(),
            ers_nominal: self.vendor.nominal,
            ers_lsl: self.vendor.lsl,
            ers_usl: self.vendor.usl,
            internal_lsl: l.map(|l| l.internal_lsl),
            internal_usl: l.map(|l| l.internal_usl),
            judge_lsl: self.judgement_lsl.as_str(),
            judge_usl: self.judgement_usl.as_str(),
            internal_raw_lsl: l.map(|l| l.internal_lsl),
            internal_raw_usl: l.map(|l| l.internal_usl),
            calculated_lsl: l.map(|l| l.lsl),
            calculated_usl: l.map(|l| l.usl),
            scaled_lsl: l.map(|l| l.scaled_lsl),
            scaled_usl: l.map(|l| l.scaled_usl),
        }
    }
}

/// Flat, serializable view of a [`ResultRow`]
///
/// The internal rounded pair (`ROUNDUP`/`ROUNDDOWN` of the raw pair) and
/// the raw pair are both whole numbers, so they carry the same values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub no: String,
    pub net_name: String,
    pub btob_name: String,
    pub btob_pin: String,
    pub acf_name: String,
    pub acf_pin: String,
    pub pin_a: String,
    pub pin_b: String,
    pub ers_nominal: Option<f64>,
    pub ers_lsl: Option<f64>,
    pub ers_usl: Option<f64>,
    pub internal_lsl: Option<i64>,
    pub internal_usl: Option<i64>,
    pub judge_lsl: &'static str,
    pub judge_usl: &'static str,
    pub internal_raw_lsl: Option<i64>,
    pub internal_raw_usl: Option<i64>,
    pub calculated_lsl: Option<f64>,
    pub calculated_usl: Option<f64>,
    pub scaled_lsl: Option<i64>,
    pub scaled_usl: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor(lsl: Option<f64>, usl: Option<f64>) -> VendorSpecEntry {
        VendorSpecEntry {
            nominal: Some(20.0),
            usl,
            lsl,
        }
    }

    #[test]
    fn test_judgement_bounds() {
        assert_eq!(Judgement::lower(Some(5), Some(10.0)), Judgement::Ng);
        assert_eq!(Judgement::lower(Some(10), Some(10.0)), Judgement::Ok);
        assert_eq!(Judgement::upper(Some(31), Some(30.0)), Judgement::Ng);
        assert_eq!(Judgement::upper(Some(30), Some(30.0)), Judgement::Ok);
        assert_eq!(Judgement::lower(None, Some(10.0)), Judgement::CannotJudge);
        assert_eq!(Judgement::upper(Some(3), None), Judgement::CannotJudge);
    }

    #[test]
    fn test_row_judges_internal_pair() {
        // internal pair 1226 / 1243
        let limits = LimitResult::derive(1.23456, 0.001);
        let row = ResultRow::new(NetIdentity::default(), vendor(Some(1000.0), Some(1240.0)), Some(limits));
        assert_eq!(row.judgement_lsl, Judgement::Ok);
        assert_eq!(row.judgement_usl, Judgement::Ng);
    }

    #[test]
    fn test_lookup_miss_cannot_judge() {
        let limits = LimitResult::derive(1.0, 0.01);
        let row = ResultRow::new(NetIdentity::default(), VendorSpecEntry::MISS, Some(limits));
        assert_eq!(row.judgement_lsl, Judgement::CannotJudge);
        assert_eq!(row.judgement_usl, Judgement::CannotJudge);
        let record = row.to_record();
        assert_eq!(record.judge_lsl, "");
        assert_eq!(record.ers_nominal, None);
        assert_eq!(record.calculated_lsl, Some(0.97));
    }

    #[test]
    fn test_sentinel_record() {
        let row = ResultRow::new(NetIdentity::default(), VendorSpecEntry::MISS, Some(LimitResult::sentinel()));
        assert!(row.is_sentinel());
        let record = row.to_record();
        assert_eq!(record.internal_lsl, Some(0));
        assert_eq!(record.internal_usl, Some(50));
        assert_eq!(record.calculated_usl, Some(0.05));
        assert_eq!(record.scaled_usl, Some(50));
    }

    #[test]
    fn test_vendor_key_from_identity() {
        let id = NetIdentity {
            btob_name: CellValue::Text("J_TELE".into()),
            btob_pin: CellValue::Number(18.0),
            acf_name: CellValue::Text("U0200".into()),
            acf_pin: CellValue::Number(8.0),
            ..NetIdentity::default()
        };
        assert_eq!(id.vendor_key().as_deref(), Some("J_TELE.18U0200.8"));
        assert_eq!(NetIdentity::default().vendor_key(), None);
    }

    #[test]
    fn test_judgement_serializes_as_sheet_text() {
        assert_eq!(serde_json::to_string(&Judgement::Ng).unwrap(), "\"NG\"");
        assert_eq!(serde_json::to_string(&Judgement::CannotJudge).unwrap(), "\"\"");
    }
}
