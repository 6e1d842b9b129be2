//! Prompt text sent with each generation call.

use serde::Serialize;

/// System instruction shared by every call.
pub const SYSTEM_INSTRUCTION: &str = "\
[PERAN DAN IDENTITAS]
Anda adalah \"Asisten Kurikulum Digital (AKD)\", ahli pedagogi dan perancang kurikulum profesional.

[STANDAR KUALITAS RPP KBC]
1. Keterkaitan (Alignment): Tujuan, Kegiatan, dan Asesmen harus terhubung erat.
2. Integrasi Tema: Nilai Panca Cinta (KBC) dan Profil Lulusan (DPL) harus terjalin secara naratif.
3. Pembelajaran Mendalam: Alur Memahami, Mengaplikasi, dan Merefleksi.

[INSTRUKSI OUTPUT]
- Kembalikan respons dalam format JSON murni.
- Bahasa Indonesia formal (EBI).
- Gunakan id tujuan pembelajaran berurutan: tp_1, tp_2, dan seterusnya.
";

fn with_details(lead: &str, details: &impl Serialize) -> Result<String, serde_json::Error> {
    Ok(format!("{lead}: {}", serde_json::to_string(details)?))
}

/// Combined objectives and framework.
pub fn objectives_with_framework(details: &impl Serialize) -> Result<String, serde_json::Error> {
    with_details(
        "Buatlah Tujuan Pembelajaran dan Kerangka Pembelajaran (Praktik, Lingkungan, Digital) \
         secara sekaligus untuk detail berikut",
        details,
    )
}

/// Objectives only.
pub fn objectives(details: &impl Serialize) -> Result<String, serde_json::Error> {
    with_details(
        "Buatlah Tujuan Pembelajaran beserta rujukan Capaian Pembelajaran (CP) dan alokasi \
         waktu untuk detail berikut",
        details,
    )
}

/// Framework for given objectives.
pub fn framework(details: &impl Serialize) -> Result<String, serde_json::Error> {
    with_details(
        "Buatlah Kerangka Pembelajaran (Praktik Pedagogis, Kemitraan, Lingkungan, Pemanfaatan \
         Digital) untuk detail berikut",
        details,
    )
}

/// Activity scenario.
pub fn scenario(details: &impl Serialize) -> Result<String, serde_json::Error> {
    with_details("Buat skenario kegiatan (Awal, Inti, Penutup) untuk", details)
}

/// Assessment package.
pub fn assessment(details: &impl Serialize) -> Result<String, serde_json::Error> {
    with_details("Buat paket asesmen lengkap untuk", details)
}
