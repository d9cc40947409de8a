//! Сопоставление заголовков файла с каноническими полями вопроса.
//!
//! Заголовки сравниваются после trim + lowercase, поэтому "CEVAP",
//! " Cevap " и "cevap" - одно и то же. Для каждого поля побеждает первый
//! по списку алиас, у которого в строке есть непустое значение.

use contracts::domain::a001_question::{CanonicalField, ImportRow};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

/// Строка после нормализации: только канонические поля с непустыми значениями
pub type CanonicalRow = BTreeMap<CanonicalField, String>;

/// Допустимые написания заголовков, в порядке приоритета
pub fn aliases(field: CanonicalField) -> &'static [&'static str] {
    match field {
        CanonicalField::Key => &[
            "key",
            "questionkey",
            "question key",
            "question_key",
            "anahtar",
            "soru anahtarı",
            "soru anahtari",
            "id",
        ],
        CanonicalField::Text => &[
            "text",
            "questiontext",
            "question text",
            "question_text",
            "question",
            "soru metni",
            "soru",
        ],
        CanonicalField::Answer => &[
            "answer",
            "cevap",
            "doğru cevap",
            "dogru cevap",
            "correct answer",
            "correct_answer",
        ],
        CanonicalField::Option1 => &[
            "option1", "option 1", "option_1", "şık1", "şık 1", "sik1", "sik 1", "seçenek1",
            "seçenek 1", "secenek1", "secenek 1", "a",
        ],
        CanonicalField::Option2 => &[
            "option2", "option 2", "option_2", "şık2", "şık 2", "sik2", "sik 2", "seçenek2",
            "seçenek 2", "secenek2", "secenek 2", "b",
        ],
        CanonicalField::Option3 => &[
            "option3", "option 3", "option_3", "şık3", "şık 3", "sik3", "sik 3", "seçenek3",
            "seçenek 3", "secenek3", "secenek 3", "c",
        ],
        CanonicalField::Option4 => &[
            "option4", "option 4", "option_4", "şık4", "şık 4", "sik4", "sik 4", "seçenek4",
            "seçenek 4", "secenek4", "secenek 4", "d",
        ],
    }
}

/// нормализованный алиас -> (поле, приоритет)
static ALIAS_INDEX: Lazy<HashMap<String, (CanonicalField, usize)>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for field in CanonicalField::ALL {
        for (rank, alias) in aliases(field).iter().enumerate() {
            index.entry(normalize_header(alias)).or_insert((field, rank));
        }
    }
    index
});

/// trim + lowercase + схлопывание пробелов.
/// Lowercase турецкой "İ" дает "i" + U+0307 (точку выбрасываем), а "I" дает "i",
/// поэтому "ı" тоже приводим к "i": "ŞIK" и "Şık" совпадают.
pub fn normalize_header(raw: &str) -> String {
    raw.to_lowercase()
        .replace('\u{307}', "")
        .replace('ı', "i")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Каноническое поле для заголовка, если он известен
pub fn canonical_field(raw_header: &str) -> Option<CanonicalField> {
    ALIAS_INDEX
        .get(normalize_header(raw_header).as_str())
        .map(|(field, _)| *field)
}

pub fn normalize_row(row: &ImportRow) -> CanonicalRow {
    // (приоритет алиаса, исходный заголовок) - второе только для детерминизма,
    // когда два заголовка схлопываются в один и тот же алиас
    let mut best: BTreeMap<CanonicalField, ((usize, &str), String)> = BTreeMap::new();

    for (header, value) in &row.cells {
        let Some(&(field, rank)) = ALIAS_INDEX.get(normalize_header(header).as_str()) else {
            continue;
        };
        let Some(text) = value.as_text() else {
            continue;
        };

        let candidate = (rank, header.as_str());
        match best.get(&field) {
            Some((current, _)) if *current <= candidate => {}
            _ => {
                best.insert(field, (candidate, text));
            }
        }
    }

    best.into_iter()
        .map(|(field, (_, text))| (field, text))
        .collect()
}
