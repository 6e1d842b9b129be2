//! Response schemas for the generation service.
//!
//! The format is the OpenAPI subset accepted by Gemini's `responseSchema`:
//! upper-case type names, and every listed property is required.

use serde_json::{json, Map, Value};

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn strings() -> Value {
    arr(string())
}

fn arr(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

fn obj(properties: &[(&str, Value)]) -> Value {
    let mut props = Map::new();
    for (name, schema) in properties {
        props.insert((*name).to_string(), schema.clone());
    }
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
    json!({
        "type": "OBJECT",
        "properties": props,
        "required": required,
    })
}

fn text_obj(fields: &[&str]) -> Value {
    let properties: Vec<(&str, Value)> = fields.iter().map(|f| (*f, string())).collect();
    obj(&properties)
}

fn objective_list() -> Value {
    arr(text_obj(&["id", "deskripsi"]))
}

fn question_list() -> Value {
    arr(text_obj(&["id", "pertanyaan"]))
}

/// Schema of the `kerangka` object.
#[must_use]
pub fn framework_schema() -> Value {
    obj(&[
        (
            "praktik_pedagogis",
            obj(&[("model_pembelajaran", string()), ("metode", strings())]),
        ),
        ("kemitraan_pembelajaran", strings()),
        (
            "lingkungan_pembelajaran",
            text_obj(&["lingkungan_fisik", "ruang_virtual", "budaya_belajar"]),
        ),
        (
            "pemanfaatan_digital",
            text_obj(&["stimulus", "pencarian_informasi", "pembuatan_produk"]),
        ),
    ])
}

/// Schema of the objectives-only response.
#[must_use]
pub fn objectives_draft_schema() -> Value {
    obj(&[
        ("tujuan_pembelajaran", objective_list()),
        ("ref_cp", string()),
        ("alokasi_waktu", string()),
    ])
}

/// Schema of the combined objectives and framework response.
#[must_use]
pub fn objectives_schema() -> Value {
    obj(&[
        ("tujuan_pembelajaran", objective_list()),
        ("ref_cp", string()),
        ("alokasi_waktu", string()),
        ("kerangka", framework_schema()),
    ])
}

/// Schema of the scenario response.
#[must_use]
pub fn scenario_schema() -> Value {
    let phase = obj(&[
        ("penjelasan", string()),
        ("aktivitas", arr(text_obj(&["sintaks", "deskripsi"]))),
    ]);
    obj(&[
        (
            "kegiatan_awal",
            obj(&[
                ("apersepsi", string()),
                (
                    "pertanyaan_pemantik",
                    arr(text_obj(&["pertanyaan", "kaitan_kbc"])),
                ),
            ]),
        ),
        (
            "kegiatan_inti",
            obj(&[
                ("memahami", phase.clone()),
                ("mengaplikasi", phase.clone()),
                ("merefleksi", phase),
            ]),
        ),
        (
            "kegiatan_penutup",
            text_obj(&["refleksi", "tindak_lanjut"]),
        ),
    ])
}

/// Schema of the assessment response.
#[must_use]
pub fn assessment_schema() -> Value {
    obj(&[
        (
            "asesmen_diagnostik",
            obj(&[
                ("instrumen", string()),
                ("pertanyaan", question_list()),
                ("rubrik", arr(text_obj(&["kategori", "kriteria"]))),
            ]),
        ),
        (
            "asesmen_formatif",
            obj(&[
                ("instrumen", string()),
                (
                    "rubrik",
                    arr(text_obj(&["aspek", "skor_4", "skor_3", "skor_2", "skor_1"])),
                ),
            ]),
        ),
        (
            "asesmen_sumatif",
            obj(&[
                ("instrumen", string()),
                ("pertanyaan", question_list()),
                (
                    "rubrik_esai",
                    arr(text_obj(&["aspek", "skor_5", "skor_3", "skor_1"])),
                ),
            ]),
        ),
        (
            "validasi_keselarasan",
            arr(obj(&[
                ("item_asesmen", string()),
                ("tp_terukur", strings()),
                ("kbc_dpl_terukur", strings()),
                ("catatan_keselarasan", string()),
            ])),
        ),
    ])
}
