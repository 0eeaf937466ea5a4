pub mod bcc;
pub mod cine_royale;
pub mod flik;
pub mod galaxy;
pub mod kncc;
pub mod lines;
pub mod ozone;
pub mod ozone_weekly;
pub mod qbc;
pub mod safeer;
pub mod shaab;
pub mod sky;
pub mod star;
pub mod truth_weekly;

use anyhow::Result;

use crate::document::Document;
use crate::rows::RawTicketRow;

/// One extractor variant per vendor report layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    Sky,
    Galaxy,
    Kncc,
    Ozone,
    OzoneWeekly,
    Bcc,
    Flik,
    Qbc,
    Safeer,
    TruthWeekly,
    CineRoyale,
    Shaab,
    Star,
}

impl ExtractorKind {
    /// Route an exhibitor label from the mapping sheet to its extractor.
    /// The Vista chains (Cinepolis, Vox, Reel, NOVO, Cinemacity, Roxy) all
    /// print the same detailed-distributors layout.
    pub fn for_exhibitor(exhibitor: &str) -> Option<ExtractorKind> {
        match exhibitor.trim().to_uppercase().as_str() {
            "CINEPOLIS" | "VOX" | "REEL" | "NOVO" | "CINEMACITY" | "ROXY" | "SKY" => {
                Some(ExtractorKind::Sky)
            }
            "GALAXY" => Some(ExtractorKind::Galaxy),
            "KNCC" | "CINESCAPE" => Some(ExtractorKind::Kncc),
            "OZONE" => Some(ExtractorKind::Ozone),
            "OZONE WEEKLY" => Some(ExtractorKind::OzoneWeekly),
            "BCC" => Some(ExtractorKind::Bcc),
            "FLIK" => Some(ExtractorKind::Flik),
            "QBC" => Some(ExtractorKind::Qbc),
            "SAFEER" => Some(ExtractorKind::Safeer),
            "TRUTH" | "TRUTH WEEKLY" => Some(ExtractorKind::TruthWeekly),
            "CINE ROYALE" => Some(ExtractorKind::CineRoyale),
            "SHAAB" => Some(ExtractorKind::Shaab),
            "STAR CINEMAS" => Some(ExtractorKind::Star),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExtractorKind::Sky => "sky",
            ExtractorKind::Galaxy => "galaxy",
            ExtractorKind::Kncc => "kncc",
            ExtractorKind::Ozone => "ozone",
            ExtractorKind::OzoneWeekly => "ozone_weekly",
            ExtractorKind::Bcc => "bcc",
            ExtractorKind::Flik => "flik",
            ExtractorKind::Qbc => "qbc",
            ExtractorKind::Safeer => "safeer",
            ExtractorKind::TruthWeekly => "truth_weekly",
            ExtractorKind::CineRoyale => "cine_royale",
            ExtractorKind::Shaab => "shaab",
            ExtractorKind::Star => "star",
        }
    }
}

/// Constant vocabularies injected into the extractors at construction.
/// These are business reference data, not parser internals, so they live in
/// one place where a new screen or format can be added without touching the
/// state machines.
#[derive(Debug, Clone)]
pub struct VendorRules {
    /// Movie format labels recognized in Vista summary/detail tables.
    pub formats: Vec<String>,
    /// "Screen N" labels used by Galaxy reports.
    pub galaxy_screens: Vec<String>,
    /// Screen labels used by Safeer reports.
    pub safeer_screens: Vec<String>,
    /// Ticket class labels used by Safeer reports.
    pub safeer_ticket_types: Vec<String>,
    /// KNCC head-office report: printed site name -> short room label.
    pub kncc_cinemas: Vec<(String, String)>,
}

impl Default for VendorRules {
    fn default() -> Self {
        let formats = [
            "2D", "3D", "4D", "IMAX 3D", "IMAX", "ATMOS", "MX4D", "DOLBY", "4DX",
            "3D ARABIC", "2D ARABIC", "2D FRENCH", "3D FRENCH", "4DX 3D",
            "MAX 2D", "ADJ 2D", "ADJ 3D", "ATMOS 3D", "ADJ 2D AR", "ADJ 4DX",
            "SCREEN X", "MAX 3D", "IMAX LASER 3D", "MX4D 3D", "IMAX LASER 2D",
            "4D E MOTION", "4D E MOTION 3D", "2D JAPANESE", "ICE", "SPHERA",
            "2D HINDI", "2D TAMIL", "XPERIENCE", "2D TELUGU", "2D MALAYALAM",
            "4DX-2D", "4DX-3D", "4DX-4D", "IMAX-2D", "IMAX-2",
        ];
        let galaxy_screens: Vec<String> = (1..=15).map(|n| format!("Screen {}", n)).collect();
        let safeer_screens = [
            "SAFEER PRIME", "SCREEN-1", "SCREEN-2", "SCREEN-3", "SCREEN-4",
            "SCREEN-5", "SCREEN-6", "SCREEN-7", "SCREEN-8", "SCREEN-9", "SCREEN-10",
        ];
        let kncc_cinemas = [
            ("1954 Film House", "1954 FILM HOUSE"),
            ("Cinescape 360", "360 CINEMA"),
            ("Cinescape Al Assima", "AL ASSIMA"),
            ("Cinescape Avenues", "AVENUES"),
            ("Cinescape Al-Bairaq", "BAIRAQ"),
            ("Cinescape Khiran", "KHIRAN"),
            ("Cinescape Al-Kout", "KOUT"),
            ("Cinescape Warehouse", "WAREHOUSE"),
            ("Cinescape Al-Fanar", "FANAR"),
            ("Cinescape Muhallab", "MUHALLAB"),
        ];
        VendorRules {
            formats: formats.iter().map(|s| s.to_string()).collect(),
            galaxy_screens,
            safeer_screens: safeer_screens.iter().map(|s| s.to_string()).collect(),
            safeer_ticket_types: vec![
                "PREMIUM".to_string(),
                "STANDARD".to_string(),
                "PRIME".to_string(),
            ],
            kncc_cinemas: kncc_cinemas
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        }
    }
}

/// Run the selected extractor over a whole document. Errors abort the
/// document (the caller discards partial rows), never the batch.
pub fn run(
    kind: ExtractorKind,
    doc: &Document,
    exhibitor: &str,
    rules: &VendorRules,
    extracted_at: &str,
) -> Result<Vec<RawTicketRow>> {
    match kind {
        ExtractorKind::Sky => sky::extract(doc, exhibitor, rules, extracted_at),
        ExtractorKind::Galaxy => galaxy::extract(doc, exhibitor, rules, extracted_at),
        ExtractorKind::Kncc => kncc::extract(doc, exhibitor, rules, extracted_at),
        ExtractorKind::Ozone => ozone::extract(doc, exhibitor, extracted_at),
        ExtractorKind::OzoneWeekly => ozone_weekly::extract(doc, exhibitor, extracted_at),
        ExtractorKind::Bcc => bcc::extract(doc, exhibitor, extracted_at),
        ExtractorKind::Flik => flik::extract(doc, exhibitor, extracted_at),
        ExtractorKind::Qbc => qbc::extract(doc, exhibitor, extracted_at),
        ExtractorKind::Safeer => safeer::extract(doc, exhibitor, rules, extracted_at),
        ExtractorKind::TruthWeekly => truth_weekly::extract(doc, exhibitor, extracted_at),
        ExtractorKind::CineRoyale => cine_royale::extract(doc, exhibitor, extracted_at),
        ExtractorKind::Shaab => shaab::extract(doc, exhibitor, extracted_at),
        ExtractorKind::Star => star::extract(doc, exhibitor, extracted_at),
    }
}
