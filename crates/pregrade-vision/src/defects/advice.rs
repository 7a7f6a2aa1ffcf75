// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-defect recommendation texts, one per kind and priority tier.

use pregrade_core::{DefectKind, Priority};

pub fn recommendation_text(kind: DefectKind, priority: Priority) -> &'static str {
    use DefectKind::*;
    use Priority::*;

    match (kind, priority) {
        (Scratches, Low) => "Minor surface scratches detected. Consider professional cleaning.",
        (Scratches, Medium) => {
            "Moderate scratches may affect grade. Professional restoration recommended."
        }
        (Scratches, High) => {
            "Significant scratching detected. Will likely impact PSA grade significantly."
        }

        (Dents, Low) => "Minor surface dents detected. May be improved with careful handling.",
        (Dents, Medium) => "Moderate dents present. Professional assessment recommended.",
        (Dents, High) => "Severe dents detected. Will significantly impact card grade.",

        (CornerWear, Low) => "Minor corner wear detected. Common in vintage cards.",
        (CornerWear, Medium) => "Moderate corner wear. May limit grade to NM-MT or lower.",
        (CornerWear, High) => "Significant corner damage. Will limit grade to EX or lower.",

        (EdgeWear, Low) => "Minor edge wear detected. Normal for circulated cards.",
        (EdgeWear, Medium) => "Moderate edge wear. Will affect grade assessment.",
        (EdgeWear, High) => "Severe edge wear. Will significantly limit grade potential.",

        (SurfaceDamage, Low) => "Minor surface irregularities detected.",
        (SurfaceDamage, Medium) => "Moderate surface damage. Professional cleaning may help.",
        (SurfaceDamage, High) => "Significant surface damage. Will impact grade significantly.",

        (Discoloration, Low) => "Minor color variations detected.",
        (Discoloration, Medium) => "Moderate discoloration. May indicate storage issues.",
        (Discoloration, High) => "Significant discoloration. Will affect grade and value.",

        (PrintingDefects, Low) => "Minor printing inconsistencies detected.",
        (PrintingDefects, Medium) => "Moderate printing defects. May be factory-related.",
        (PrintingDefects, High) => "Significant printing defects. Will impact grade assessment.",

        (WaterDamage, Low) => "Minor water damage indicators detected.",
        (WaterDamage, Medium) => "Moderate water damage. Professional assessment recommended.",
        (WaterDamage, High) => {
            "Severe water damage detected. Will severely limit grade potential."
        }
    }
}
