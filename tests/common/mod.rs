//! Shared test helpers for integration tests
//!
//! Fixtures model a run with 3 NETs, 2 pieces and 2 complete sets, plus
//! one grid row that the Method filter drops.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get a netlimits command
pub fn netlimits() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("netlimits"));
    cmd.env_remove("RUST_LOG").env_remove("NETLIMITS_CONFIG");
    cmd
}

/// Paths of the fixture files inside a temp dir
pub struct Fixture {
    pub dir: TempDir,
    pub grid: PathBuf,
    pub reference: PathBuf,
    pub vendor: PathBuf,
}

impl Fixture {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Raw grid: header, one Method 2 row, then 2 sets of 3 NETs
pub const GRID_CSV: &str = "\
PinA,PinB,Site,Method,Range,Unit,Piece1,Piece2
X,Y,1,2,,mOhm,9,9
P1,N1,1,3,,mOhm,1.231,1.235
P2,N2,1,3,,mOhm,2.10,2.12
P3,N3,1,3,,mOhm,0.01,0.02
P1,N1,1,3,,mOhm,1.233,1.237
P2,N2,1,3,,mOhm,2.11,2.13
P3,N3,1,3,,mOhm,0.011,0.012
";

/// Reference sheet: 3 title rows, then one identity row per NET (C..H),
/// with room for the L..O write-back
pub const REFERENCE_CSV: &str = "\
,,DCR,,,,,,,,,,,,
,,No,Net name,BtoB,,ACF,,ERS,,,3 sigma spec,,On machine,
,,,,Name,Pin,Name,Pin,Nominal,LSL,USL,LSL,USL,LSL,USL
,,1,VBAT,J1,1,U2,10,,,,,,,
,,2,VSYS,J1,2,U2,20,,,,,,,
,,3,GND,J1,3,U2,30,,,,,,,
";

/// Vendor sheet: 9 header rows, then pins in G/H and nominal/USL/LSL in O/P/Q
pub fn vendor_csv() -> String {
    let mut out = String::new();
    for i in 0..9 {
        let mut row = vec![String::new(); 17];
        row[0] = format!("header {}", i);
        out.push_str(&row.join(","));
        out.push('\n');
    }
    for (pin1, pin2, nominal, usl, lsl) in [
        ("J1.1", "U2.10", "1234", "1300", "1200"),
        ("J1.2", "U2.20", "2115", "2150", "2080"),
    ] {
        let mut row = vec![String::new(); 17];
        row[6] = pin1.to_string();
        row[7] = pin2.to_string();
        row[14] = nominal.to_string();
        row[15] = usl.to_string();
        row[16] = lsl.to_string();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Write the three fixture files into a fresh temp dir
pub fn setup_fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let grid = dir.path().join("grid.csv");
    let reference = dir.path().join("reference.csv");
    let vendor = dir.path().join("vendor.csv");
    fs::write(&grid, GRID_CSV).unwrap();
    fs::write(&reference, REFERENCE_CSV).unwrap();
    fs::write(&vendor, vendor_csv()).unwrap();
    Fixture {
        dir,
        grid,
        reference,
        vendor,
    }
}

/// `calc` with all three fixture inputs
pub fn calc_cmd(fx: &Fixture) -> Command {
    let mut cmd = netlimits();
    cmd.current_dir(fx.dir.path()).args([
        "calc",
        "--grid",
        fx.grid.to_str().unwrap(),
        "--reference",
        fx.reference.to_str().unwrap(),
        "--vendor",
        fx.vendor.to_str().unwrap(),
    ]);
    cmd
}
