//! The RPP document layout.
//!
//! Sections A to E in fixed order, followed by the signature block.

use chrono::{Datelike, NaiveDate};

use super::document::{Align, Cell, Document, Paragraph, ParagraphStyle, Run, Table};
use super::ExportBundle;
use crate::model::{LessonInput, DPL_OPTIONS, KBC_OPTIONS};

const CREATOR: &str = "Asisten Kurikulum Digital (AKD)";
const DESCRIPTION: &str = "Rencana Pelaksanaan Pembelajaran yang dihasilkan oleh AKD";

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const OPTION_INDENT: u32 = 400;
const LIST_INDENT: u32 = 360;

/// `<tempat>, <d> <bulan> <yyyy>` with the Indonesian month name.
#[must_use]
pub fn signature_date(tempat: &str, date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{tempat}, {} {month} {}", date.day(), date.year())
}

/// Lays out the full document for `bundle`.
#[must_use]
pub fn build_document(bundle: &ExportBundle) -> Document {
    let mut doc = Document {
        title: format!("RPP - {}", bundle.lesson.topik),
        creator: CREATOR.to_string(),
        description: DESCRIPTION.to_string(),
        blocks: Vec::new(),
    };

    doc.push(
        Paragraph::heading(ParagraphStyle::Title, "RENCANA PELAKSANAAN PEMBELAJARAN (RPP)")
            .align(Align::Center),
    );
    doc.push(
        Paragraph::heading(ParagraphStyle::Title, "(MENDALAM BERBASIS CINTA)").align(Align::Center),
    );
    doc.push(Paragraph::blank());

    overview(&mut doc, bundle);
    identification(&mut doc, &bundle.lesson);
    design(&mut doc, bundle);
    experience(&mut doc, bundle);
    assessment(&mut doc, bundle);
    signature(&mut doc, bundle);
    doc
}

fn h1(doc: &mut Document, text: &str) {
    doc.push(Paragraph::heading(ParagraphStyle::Heading1, text));
}

fn h2(doc: &mut Document, text: &str) {
    doc.push(Paragraph::heading(ParagraphStyle::Heading2, text));
}

fn h3(doc: &mut Document, text: &str) {
    doc.push(Paragraph::heading(ParagraphStyle::Heading3, text));
}

fn bold_line(doc: &mut Document, text: &str) {
    doc.push(Paragraph::runs(vec![Run::bold(text)]));
}

fn numbered<'a>(doc: &mut Document, items: impl IntoIterator<Item = &'a str>) {
    for (i, item) in items.into_iter().enumerate() {
        doc.push(Paragraph::text(format!("{}. {item}", i + 1)).indent(LIST_INDENT));
    }
}

fn bulleted<I, S>(doc: &mut Document, items: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for item in items {
        doc.push(Paragraph::text(format!("• {}", item.as_ref())).indent(LIST_INDENT));
    }
}

fn rubric_table(header: &[&str], rows: Vec<Vec<&str>>) -> Table {
    let mut table_rows = vec![header
        .iter()
        .map(|h| Cell::new(Paragraph::runs(vec![Run::bold(*h)])))
        .collect::<Vec<_>>()];
    for row in rows {
        table_rows.push(
            row.into_iter()
                .enumerate()
                .map(|(i, text)| {
                    if i == 0 {
                        Cell::new(Paragraph::runs(vec![Run::bold(text)]))
                    } else {
                        Cell::new(Paragraph::text(text).align(Align::Justified))
                    }
                })
                .collect(),
        );
    }
    Table {
        rows: table_rows,
        column_widths: Vec::new(),
        borders: true,
    }
}

fn overview(doc: &mut Document, bundle: &ExportBundle) {
    let lesson = &bundle.lesson;
    h1(doc, "A. Spesifikasi");
    let rows = [
        ("1. Madrasah", lesson.madrasah.as_str()),
        ("2. Mata Pelajaran", lesson.mapel.as_str()),
        ("3. Kelas / Semester", lesson.kelas.as_str()),
        ("4. Topik Pembelajaran", lesson.topik.as_str()),
        ("5. Alokasi Waktu", bundle.objectives.alokasi_waktu.as_str()),
    ];
    doc.push_table(Table {
        rows: rows
            .into_iter()
            .map(|(label, value)| {
                vec![
                    Cell::new(Paragraph::text(label)),
                    Cell::new(Paragraph::text(format!(": {value}"))),
                ]
            })
            .collect(),
        column_widths: vec![3000, 6500],
        borders: false,
    });
    doc.push(Paragraph::blank());
}

fn checklist(doc: &mut Document, options: &[&str], selected: &[String]) {
    for option in options {
        let mark = if selected.iter().any(|s| s == option) { "☑ " } else { "☐ " };
        doc.push(Paragraph::runs(vec![Run::plain(mark), Run::plain(*option)]).indent(OPTION_INDENT));
    }
}

fn identification(doc: &mut Document, lesson: &LessonInput) {
    h1(doc, "B. Identifikasi");
    h2(doc, "1. Kesiapan Murid (opsional)");
    doc.push(
        Paragraph::text(format!(
            "Murid memiliki pemahaman awal tentang konsep dasar {} dari pelajaran sebelumnya.",
            lesson.topik
        ))
        .align(Align::Justified),
    );
    h2(doc, "2. Dimensi Profil Lulusan");
    checklist(doc, &DPL_OPTIONS, &lesson.list_dpl_terpilih);
    h2(doc, "3. Topik Panca Cinta");
    checklist(doc, &KBC_OPTIONS, &lesson.list_kbc_terpilih);
    h2(doc, "4. Materi Integrasi KBC");
    doc.push(
        Paragraph::text(format!(
            "Pembelajaran ini mengintegrasikan {} dengan menekankan bagaimana pemahaman tentang {} mendorong {}.",
            lesson.list_kbc_terpilih.join(" dan "),
            lesson.topik,
            lesson.list_dpl_terpilih.join(" dan "),
        ))
        .align(Align::Justified),
    );
    doc.push(Paragraph::blank());
}

fn design(doc: &mut Document, bundle: &ExportBundle) {
    let objectives = &bundle.objectives;
    let kerangka = &objectives.kerangka;

    h1(doc, "C. Desain Pembelajaran");
    h2(doc, "1. Tujuan Pembelajaran");
    doc.push(Paragraph::labeled("Capaian Pembelajaran", objectives.ref_cp.as_str()).align(Align::Justified));
    numbered(doc, objectives.tujuan_pembelajaran.iter().map(|o| o.deskripsi.as_str()));

    h2(doc, "2. Kerangka Pembelajaran");
    h3(doc, "a. Praktik Pedagogis");
    doc.push(Paragraph::labeled(
        "Model Pembelajaran",
        kerangka.praktik_pedagogis.model_pembelajaran.as_str(),
    ));
    doc.push(Paragraph::labeled("Metode", kerangka.praktik_pedagogis.metode.join(", ")));

    h3(doc, "b. Kemitraan Pembelajaran (Opsional)");
    bulleted(doc, &kerangka.kemitraan_pembelajaran);

    h3(doc, "c. Lingkungan Pembelajaran");
    let env = &kerangka.lingkungan_pembelajaran;
    for (label, value) in [
        ("Lingkungan Fisik", &env.lingkungan_fisik),
        ("Ruang Virtual", &env.ruang_virtual),
        ("Budaya Belajar", &env.budaya_belajar),
    ] {
        doc.push(Paragraph::labeled(label, value.as_str()).align(Align::Justified));
    }

    h3(doc, "d. Pemanfaatan Digital");
    let digital = &kerangka.pemanfaatan_digital;
    for (label, value) in [
        ("Video/Animasi", &digital.stimulus),
        ("Pencarian Informasi", &digital.pencarian_informasi),
        ("Pembuatan Produk", &digital.pembuatan_produk),
    ] {
        doc.push(Paragraph::labeled(label, value.as_str()).align(Align::Justified));
    }
    doc.push(Paragraph::blank());
}

fn experience(doc: &mut Document, bundle: &ExportBundle) {
    let scenario = &bundle.scenario;

    h1(doc, "D. Pengalaman Belajar");
    doc.push(Paragraph::text(format!(
        "(menggunakan model {})",
        bundle.lesson.model_pembelajaran
    )));

    h2(doc, "1. Kegiatan Awal");
    doc.push(
        Paragraph::labeled("Apersepsi", scenario.kegiatan_awal.apersepsi.as_str())
            .align(Align::Justified),
    );
    bold_line(doc, "Pertanyaan Pemantik:");
    bulleted(
        doc,
        scenario
            .kegiatan_awal
            .pertanyaan_pemantik
            .iter()
            .map(|q| format!("{} ({})", q.pertanyaan, q.kaitan_kbc)),
    );

    h2(doc, "2. Kegiatan Inti");
    for (i, (title, phase)) in scenario.kegiatan_inti.phases().into_iter().enumerate() {
        h3(doc, &format!("Tahap {}: {title}", i + 1));
        doc.push(Paragraph::text(phase.penjelasan.as_str()).align(Align::Justified));
        for activity in &phase.aktivitas {
            doc.push(
                Paragraph::labeled(&activity.sintaks, activity.deskripsi.as_str())
                    .align(Align::Justified),
            );
        }
    }

    h2(doc, "3. Kegiatan Penutup");
    let closing = &scenario.kegiatan_penutup;
    doc.push(Paragraph::labeled("Refleksi", closing.refleksi.as_str()).align(Align::Justified));
    doc.push(
        Paragraph::labeled("Tindak Lanjut", closing.tindak_lanjut.as_str())
            .align(Align::Justified),
    );
    doc.push(Paragraph::blank());
}

fn assessment(doc: &mut Document, bundle: &ExportBundle) {
    let package = &bundle.assessment;

    h1(doc, "E. Asesmen Pembelajaran");

    let diagnostic = &package.asesmen_diagnostik;
    h2(doc, "1. Asesmen Awal (Diagnostik)");
    doc.push(Paragraph::labeled("Instrumen", diagnostic.instrumen.as_str()));
    bold_line(doc, "Pertanyaan:");
    numbered(doc, diagnostic.pertanyaan.iter().map(|q| q.pertanyaan.as_str()));
    bold_line(doc, "Rubrik:");
    doc.push_table(rubric_table(
        &["Kategori", "Kriteria"],
        diagnostic
            .rubrik
            .iter()
            .map(|r| vec![r.kategori.as_str(), r.kriteria.as_str()])
            .collect(),
    ));

    let formative = &package.asesmen_formatif;
    h2(doc, "2. Asesmen Proses (Formatif)");
    doc.push(Paragraph::labeled("Instrumen", formative.instrumen.as_str()));
    doc.push_table(rubric_table(
        &[
            "Aspek",
            "Skor 4 (Sangat Baik)",
            "Skor 3 (Baik)",
            "Skor 2 (Cukup)",
            "Skor 1 (Kurang)",
        ],
        formative
            .rubrik
            .iter()
            .map(|r| {
                vec![
                    r.aspek.as_str(),
                    r.skor_4.as_str(),
                    r.skor_3.as_str(),
                    r.skor_2.as_str(),
                    r.skor_1.as_str(),
                ]
            })
            .collect(),
    ));

    let summative = &package.asesmen_sumatif;
    h2(doc, "3. Asesmen Akhir (Sumatif)");
    doc.push(Paragraph::labeled("Instrumen", summative.instrumen.as_str()));
    bold_line(doc, "Pertanyaan:");
    numbered(doc, summative.pertanyaan.iter().map(|q| q.pertanyaan.as_str()));
    doc.push_table(rubric_table(
        &["Aspek", "Skor 5 (Sangat Baik)", "Skor 3 (Cukup)", "Skor 1 (Kurang)"],
        summative
            .rubrik_esai
            .iter()
            .map(|r| vec![r.aspek.as_str(), r.skor_5.as_str(), r.skor_3.as_str(), r.skor_1.as_str()])
            .collect(),
    ));
    doc.push(Paragraph::blank());
    doc.push(Paragraph::blank());
}

fn signature(doc: &mut Document, bundle: &ExportBundle) {
    let lesson = &bundle.lesson;
    let centered = |p: Paragraph| Cell::new(p.align(Align::Center));
    let spacer = || Cell {
        paragraphs: vec![Paragraph::blank(); 3],
    };

    doc.push_table(Table {
        rows: vec![
            vec![
                centered(Paragraph::text("Mengetahui,")),
                centered(Paragraph::text(signature_date(&lesson.tempat, bundle.date))),
            ],
            vec![
                centered(Paragraph::text("Kepala Madrasah")),
                centered(Paragraph::text("Guru Mata Pelajaran")),
            ],
            vec![spacer(), spacer()],
            vec![
                centered(Paragraph::runs(vec![Run::underlined(
                    lesson.nama_kepala_madrasah.as_str(),
                )])),
                centered(Paragraph::runs(vec![Run::underlined(lesson.nama_guru.as_str())])),
            ],
        ],
        column_widths: vec![4500, 4500],
        borders: false,
    });
}
