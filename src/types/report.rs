//! Health report types
//!
//! A `UserReport` is the frozen result of the report step. It is only ever
//! built by the report collector once every required field is present.

use crate::errors::{Result, WizardError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Self-reported gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" | "o" => Ok(Gender::Other),
            _ => Err(WizardError::invalid_field(
                "gender",
                s,
                "expected male, female or other",
            )),
        }
    }
}

/// The eight lab measurements every report carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    VitaminD,
    VitaminB12,
    Iron,
    Calcium,
    Protein,
    Zinc,
    Magnesium,
    FolicAcid,
}

impl Nutrient {
    /// All nutrients in display order
    pub const ALL: [Nutrient; 8] = [
        Nutrient::VitaminD,
        Nutrient::VitaminB12,
        Nutrient::Iron,
        Nutrient::Calcium,
        Nutrient::Protein,
        Nutrient::Zinc,
        Nutrient::Magnesium,
        Nutrient::FolicAcid,
    ];

    /// Field key used in commands and intake files
    pub fn key(&self) -> &'static str {
        match self {
            Nutrient::VitaminD => "vitamin_d",
            Nutrient::VitaminB12 => "vitamin_b12",
            Nutrient::Iron => "iron",
            Nutrient::Calcium => "calcium",
            Nutrient::Protein => "protein",
            Nutrient::Zinc => "zinc",
            Nutrient::Magnesium => "magnesium",
            Nutrient::FolicAcid => "folic_acid",
        }
    }

    /// Human-readable nutrient name
    pub fn display_name(&self) -> &'static str {
        match self {
            Nutrient::VitaminD => "Vitamin D",
            Nutrient::VitaminB12 => "Vitamin B12",
            Nutrient::Iron => "Iron",
            Nutrient::Calcium => "Calcium",
            Nutrient::Protein => "Protein",
            Nutrient::Zinc => "Zinc",
            Nutrient::Magnesium => "Magnesium",
            Nutrient::FolicAcid => "Folic Acid",
        }
    }

    /// Look up a nutrient by key, ignoring case, spaces and underscores
    ///
    /// `vitamin_d`, `vitaminD` and `Vitamin D` all resolve to `VitaminD`.
    pub fn from_key(key: &str) -> Option<Nutrient> {
        let normalized: String = key
            .chars()
            .filter(|c| !matches!(c, '_' | ' ' | '-'))
            .collect::<String>()
            .to_lowercase();

        Nutrient::ALL.into_iter().find(|n| n.key().replace('_', "") == normalized)
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Nutrient lab values, one per `Nutrient`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientPanel {
    pub vitamin_d: f64,
    pub vitamin_b12: f64,
    pub iron: f64,
    pub calcium: f64,
    pub protein: f64,
    pub zinc: f64,
    pub magnesium: f64,
    pub folic_acid: f64,
}

impl NutrientPanel {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::VitaminD => self.vitamin_d,
            Nutrient::VitaminB12 => self.vitamin_b12,
            Nutrient::Iron => self.iron,
            Nutrient::Calcium => self.calcium,
            Nutrient::Protein => self.protein,
            Nutrient::Zinc => self.zinc,
            Nutrient::Magnesium => self.magnesium,
            Nutrient::FolicAcid => self.folic_acid,
        }
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        let slot = match nutrient {
            Nutrient::VitaminD => &mut self.vitamin_d,
            Nutrient::VitaminB12 => &mut self.vitamin_b12,
            Nutrient::Iron => &mut self.iron,
            Nutrient::Calcium => &mut self.calcium,
            Nutrient::Protein => &mut self.protein,
            Nutrient::Zinc => &mut self.zinc,
            Nutrient::Magnesium => &mut self.magnesium,
            Nutrient::FolicAcid => &mut self.folic_acid,
        };
        *slot = value;
    }

    /// Iterate (nutrient, value) pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        Nutrient::ALL.into_iter().map(move |n| (n, self.get(n)))
    }
}

/// File types accepted as medical report attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Pdf,
    Png,
    Jpeg,
}

impl AttachmentKind {
    /// Detect the kind from a file name's extension
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("pdf") => Ok(AttachmentKind::Pdf),
            Some("png") => Ok(AttachmentKind::Png),
            Some("jpg") | Some("jpeg") => Ok(AttachmentKind::Jpeg),
            _ => Err(WizardError::UnsupportedAttachment(file_name.to_string())),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AttachmentKind::Pdf => "application/pdf",
            AttachmentKind::Png => "image/png",
            AttachmentKind::Jpeg => "image/jpeg",
        }
    }
}

/// An attached medical report file
///
/// The contents are opaque; only the metadata is serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalReport {
    pub file_name: String,
    pub kind: AttachmentKind,
    pub size_bytes: u64,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl MedicalReport {
    /// Wrap in-memory contents as an attachment
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let kind = AttachmentKind::from_file_name(&file_name)?;

        Ok(MedicalReport {
            file_name,
            kind,
            size_bytes: bytes.len() as u64,
            bytes,
        })
    }

    /// Read an attachment from disk
    ///
    /// The extension is checked before the file is read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string());

        AttachmentKind::from_file_name(&file_name)?;
        let bytes = std::fs::read(path)?;
        Self::from_bytes(file_name, bytes)
    }
}

/// A complete, submitted health report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReport {
    pub age: u32,
    pub gender: Gender,
    /// kg
    pub weight: f64,
    /// cm
    pub height: f64,
    /// Free-form "systolic/diastolic"
    pub blood_pressure: String,
    /// mg/dL
    pub blood_sugar: f64,
    pub cholesterol: Option<f64>,
    pub existing_conditions: Vec<String>,
    pub last_test_date: NaiveDate,
    pub nutrients: NutrientPanel,
    #[serde(default)]
    pub medical_reports: Vec<MedicalReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_gender_parse() {
        assert_eq!("Male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(" f ".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("other".parse::<Gender>().unwrap(), Gender::Other);
        assert!("robot".parse::<Gender>().is_err());
    }

    #[test]
    fn test_nutrient_from_key_variants() {
        assert_eq!(Nutrient::from_key("vitamin_d"), Some(Nutrient::VitaminD));
        assert_eq!(Nutrient::from_key("vitaminD"), Some(Nutrient::VitaminD));
        assert_eq!(Nutrient::from_key("Vitamin B12"), Some(Nutrient::VitaminB12));
        assert_eq!(Nutrient::from_key("folic-acid"), Some(Nutrient::FolicAcid));
        assert_eq!(Nutrient::from_key("sodium"), None);
    }

    #[test]
    fn test_nutrient_keys_unique() {
        let mut keys: Vec<&str> = Nutrient::ALL.iter().map(|n| n.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 8);
    }

    #[test]
    fn test_panel_get_set() {
        let mut panel = NutrientPanel::default();
        panel.set(Nutrient::Zinc, 88.0);
        panel.set(Nutrient::FolicAcid, 4.5);

        assert_eq!(panel.get(Nutrient::Zinc), 88.0);
        assert_eq!(panel.folic_acid, 4.5);
        assert_eq!(panel.iter().count(), 8);
    }

    #[test]
    fn test_attachment_kind_detection() {
        assert_eq!(AttachmentKind::from_file_name("labs.PDF").unwrap(), AttachmentKind::Pdf);
        assert_eq!(AttachmentKind::from_file_name("scan.jpeg").unwrap(), AttachmentKind::Jpeg);
        assert_eq!(AttachmentKind::from_file_name("scan.jpg").unwrap(), AttachmentKind::Jpeg);
        assert!(matches!(
            AttachmentKind::from_file_name("notes.docx"),
            Err(WizardError::UnsupportedAttachment(_))
        ));
        assert!(AttachmentKind::from_file_name("README").is_err());
    }

    #[test]
    fn test_medical_report_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bloodwork.png");
        fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let report = MedicalReport::from_path(&path).unwrap();
        assert_eq!(report.file_name, "bloodwork.png");
        assert_eq!(report.kind, AttachmentKind::Png);
        assert_eq!(report.size_bytes, 4);
    }

    #[test]
    fn test_medical_report_rejects_before_reading() {
        // Missing file with a bad extension reports the extension, not I/O
        let result = MedicalReport::from_path(Path::new("/nonexistent/report.txt"));
        assert!(matches!(result, Err(WizardError::UnsupportedAttachment(_))));
    }

    #[test]
    fn test_attachment_bytes_not_serialized() {
        let report = MedicalReport::from_bytes("a.pdf", vec![1, 2, 3]).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("bytes").is_none());
        assert_eq!(json["size_bytes"], 3);
        assert_eq!(json["kind"], "pdf");
    }
}
