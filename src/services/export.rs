//! Renders the complaint table as a CSV download for offline analysis.

use crate::models::ComplaintModel;

const HEADER: &[&str] = &[
    "id",
    "user_phone",
    "name",
    "phone",
    "district",
    "block",
    "gp",
    "village",
    "landmark",
    "pincode",
    "department",
    "complaint",
    "proof",
    "voice_proof",
    "status",
    "admin_proof",
    "updated_at",
];

/// RFC 4180 style: fields containing commas, quotes, or newlines are
/// quoted, with embedded quotes doubled.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_record(out: &mut String, fields: &[String]) {
    let line: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

pub fn complaints_csv(rows: &[ComplaintModel]) -> String {
    let mut out = String::new();
    write_record(
        &mut out,
        &HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
    );
    for row in rows {
        write_record(
            &mut out,
            &[
                row.id.to_string(),
                row.user_phone.clone(),
                row.name.clone(),
                row.phone.clone(),
                row.district.clone(),
                row.block.clone(),
                row.gp.clone(),
                row.village.clone(),
                row.landmark.clone(),
                row.pincode.clone(),
                row.department.clone(),
                row.complaint.clone(),
                row.proof.clone().unwrap_or_default(),
                row.voice_proof.clone().unwrap_or_default(),
                row.status.clone(),
                row.admin_proof.clone().unwrap_or_default(),
                row.updated_at
                    .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
            ],
        );
    }
    out
}
