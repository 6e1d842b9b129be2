//! Sample lessons and stage results.
//!
//! The samples are consistent with each other: the assessment only
//! references objectives `tp_1`..`tp_3` and tags selected in
//! [`zakat_lesson`].

use crate::model::{
    Activity, AlignmentValidation, AssessmentPackage, ClosingActivities, CoreActivities,
    DiagnosticAssessment, DigitalUse, FormativeAssessment, FormativeRubricItem,
    LearningEnvironment, LearningFramework, LearningModel, LearningObjective, LearningPhase,
    LessonInput, ObjectivesDraft, ObjectivesResult, OpeningActivities, PedagogicalPractice,
    Question, RubricItem, ScenarioResult, SummativeAssessment, SummativeEssayRubricItem,
    TriggerQuestion,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// A grade-VIII Fikih lesson on zakat.
#[must_use]
pub fn zakat_lesson() -> LessonInput {
    LessonInput {
        topik: "Zakat".to_string(),
        mapel: "Fikih".to_string(),
        kelas: "VIII / Genap".to_string(),
        madrasah: "MTs Negeri 2 Bandung".to_string(),
        nama_guru: "Nur Aini, S.Ag.".to_string(),
        nama_kepala_madrasah: "H. Dedi Supriadi, M.Pd.I.".to_string(),
        tempat: "Bandung".to_string(),
        list_kbc_terpilih: strings(&["Cinta Allah dan Rasul-Nya", "Cinta Diri dan Sesama Manusia"]),
        list_dpl_terpilih: strings(&["Keimanan dan Ketakwaan kepada Tuhan YME", "Kolaborasi"]),
        model_pembelajaran: LearningModel::CooperativeLearning,
        stimulus_url: String::new(),
    }
}

fn objectives() -> Vec<LearningObjective> {
    [
        ("tp_1", "Menjelaskan pengertian, hukum, dan dalil zakat dengan benar."),
        ("tp_2", "Membedakan zakat fitrah dan zakat mal beserta ketentuannya."),
        ("tp_3", "Menghitung zakat mal sederhana dan menunjukkan kepedulian kepada mustahik."),
    ]
    .into_iter()
    .map(|(id, deskripsi)| LearningObjective {
        id: id.to_string(),
        deskripsi: deskripsi.to_string(),
    })
    .collect()
}

/// Stage 1 objectives without the framework.
#[must_use]
pub fn sample_objectives_draft() -> ObjectivesDraft {
    ObjectivesDraft {
        tujuan_pembelajaran: objectives(),
        ref_cp: "Peserta didik mampu memahami ketentuan zakat dan menerapkannya dalam kehidupan."
            .to_string(),
        alokasi_waktu: "2 x 40 menit".to_string(),
    }
}

/// The learning framework of stage 1.
#[must_use]
pub fn sample_framework() -> LearningFramework {
    LearningFramework {
        praktik_pedagogis: PedagogicalPractice {
            model_pembelajaran: "Cooperative Learning".to_string(),
            metode: strings(&["Diskusi kelompok", "Tanya jawab", "Studi kasus"]),
        },
        kemitraan_pembelajaran: strings(&["Badan Amil Zakat Nasional (BAZNAS) setempat"]),
        lingkungan_pembelajaran: LearningEnvironment {
            lingkungan_fisik: "Ruang kelas dengan meja disusun berkelompok.".to_string(),
            ruang_virtual: "Kelas daring untuk berbagi lembar kerja.".to_string(),
            budaya_belajar: "Saling menghargai pendapat dan peduli kepada sesama.".to_string(),
        },
        pemanfaatan_digital: DigitalUse {
            stimulus: "Video singkat tentang penyaluran zakat.".to_string(),
            pencarian_informasi: "Mencari nisab emas terkini di situs resmi.".to_string(),
            pembuatan_produk: "Infografis perhitungan zakat mal.".to_string(),
        },
    }
}

/// A complete stage 1 result with objectives `tp_1`..`tp_3`.
#[must_use]
pub fn sample_objectives() -> ObjectivesResult {
    sample_objectives_draft().with_framework(sample_framework())
}

fn activity(sintaks: &str, deskripsi: &str) -> Activity {
    Activity {
        sintaks: sintaks.to_string(),
        deskripsi: deskripsi.to_string(),
    }
}

/// A complete stage 2 result.
#[must_use]
pub fn sample_scenario() -> ScenarioResult {
    ScenarioResult {
        kegiatan_awal: OpeningActivities {
            apersepsi: "Guru menanyakan pengalaman murid membayar zakat fitrah.".to_string(),
            pertanyaan_pemantik: vec![TriggerQuestion {
                pertanyaan: "Mengapa Allah mewajibkan zakat?".to_string(),
                kaitan_kbc: "Cinta Allah dan Rasul-Nya".to_string(),
            }],
        },
        kegiatan_inti: CoreActivities {
            memahami: LearningPhase {
                penjelasan: "Murid memahami pengertian dan jenis zakat.".to_string(),
                aktivitas: vec![
                    activity("Orientasi", "Guru menyampaikan tujuan dan membentuk kelompok."),
                    activity("Eksplorasi", "Kelompok membaca dalil tentang zakat."),
                ],
            },
            mengaplikasi: LearningPhase {
                penjelasan: "Murid menerapkan ketentuan zakat pada kasus.".to_string(),
                aktivitas: vec![activity(
                    "Kerja Kelompok",
                    "Kelompok menghitung zakat mal dari data kasus.",
                )],
            },
            merefleksi: LearningPhase {
                penjelasan: "Murid merefleksikan manfaat zakat bagi sesama.".to_string(),
                aktivitas: vec![
                    activity("Presentasi", "Kelompok memaparkan hasil perhitungan."),
                    activity("Evaluasi", "Guru memberi umpan balik dan penguatan."),
                ],
            },
        },
        kegiatan_penutup: ClosingActivities {
            refleksi: "Murid menuliskan satu hal yang dipelajari hari ini.".to_string(),
            tindak_lanjut: "Murid mewawancarai amil zakat di lingkungan rumah.".to_string(),
        },
    }
}

fn question(id: &str, pertanyaan: &str) -> Question {
    Question {
        id: id.to_string(),
        pertanyaan: pertanyaan.to_string(),
    }
}

/// A complete stage 3 result aligned with [`sample_objectives`].
#[must_use]
pub fn sample_assessment() -> AssessmentPackage {
    AssessmentPackage {
        asesmen_diagnostik: DiagnosticAssessment {
            instrumen: "Pertanyaan lisan".to_string(),
            pertanyaan: vec![question("d_1", "Apa yang kamu ketahui tentang zakat?")],
            rubrik: vec![
                RubricItem {
                    kategori: "Paham".to_string(),
                    kriteria: "Menjelaskan zakat dengan tepat.".to_string(),
                },
                RubricItem {
                    kategori: "Belum paham".to_string(),
                    kriteria: "Belum dapat menjelaskan zakat.".to_string(),
                },
            ],
        },
        asesmen_formatif: FormativeAssessment {
            instrumen: "Lembar observasi diskusi".to_string(),
            rubrik: vec![FormativeRubricItem {
                aspek: "Kerja sama".to_string(),
                skor_4: "Aktif dan membantu seluruh anggota.".to_string(),
                skor_3: "Aktif dalam diskusi.".to_string(),
                skor_2: "Sesekali terlibat.".to_string(),
                skor_1: "Tidak terlibat.".to_string(),
            }],
        },
        asesmen_sumatif: SummativeAssessment {
            instrumen: "Tes tertulis uraian".to_string(),
            pertanyaan: vec![
                question("s_1", "Jelaskan perbedaan zakat fitrah dan zakat mal."),
                question("s_2", "Hitunglah zakat dari tabungan emas 100 gram."),
            ],
            rubrik_esai: vec![SummativeEssayRubricItem {
                aspek: "Ketepatan konsep".to_string(),
                skor_5: "Konsep benar dan lengkap.".to_string(),
                skor_3: "Konsep benar sebagian.".to_string(),
                skor_1: "Konsep keliru.".to_string(),
            }],
        },
        validasi_keselarasan: vec![
            AlignmentValidation {
                item_asesmen: "Sumatif s_1".to_string(),
                tp_terukur: strings(&["tp_1", "tp_2"]),
                kbc_dpl_terukur: strings(&["Cinta Allah dan Rasul-Nya"]),
                catatan_keselarasan: "Mengukur pemahaman konsep zakat.".to_string(),
            },
            AlignmentValidation {
                item_asesmen: "Sumatif s_2".to_string(),
                tp_terukur: strings(&["tp_3"]),
                kbc_dpl_terukur: strings(&["Cinta Diri dan Sesama Manusia", "Kolaborasi"]),
                catatan_keselarasan: "Mengukur keterampilan menghitung zakat.".to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_samples_match_lesson_tags() {
        let lesson = zakat_lesson();
        assert!(lesson.validate().is_ok());
        for entry in &sample_assessment().validasi_keselarasan {
            for tag in &entry.kbc_dpl_terukur {
                assert!(lesson.has_value_tag(tag), "{tag} is not selected");
            }
        }
    }

    #[test]
    fn test_samples_round_trip_through_payload() {
        let json = serde_json::to_string(&sample_scenario()).unwrap();
        let parsed = contracts::TypedPayload::<ScenarioResult>::new("scenario")
            .parse(&json)
            .unwrap();
        assert_eq!(parsed, sample_scenario());
    }
}
