use std::collections::HashSet;
use thiserror::Error;

/// Счетчик дошел до u64::MAX, свободных номеров больше нет
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no free keys left for prefix {prefix}")]
pub struct KeysExhausted {
    pub prefix: String,
}

/// Выдает уникальные ключи вида `<prefix><n>` для строк без ключа.
///
/// Счетчик стартует с (максимальный номер среди существующих ключей
/// `<prefix><цифры>`) + 1. Каждый выданный ключ сразу резервируется, так что
/// в пределах одного batch коллизий нет.
#[derive(Debug, Clone)]
pub struct KeyAssigner {
    prefix: String,
    reserved: HashSet<String>,
    /// None - номера кончились
    next: Option<u64>,
}

impl KeyAssigner {
    pub fn new<I, S>(prefix: impl Into<String>, existing_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefix = prefix.into();
        let reserved: HashSet<String> = existing_keys.into_iter().map(Into::into).collect();
        // Суффикс, после которого нет следующего номера, тоже считается битым
        let seed = reserved
            .iter()
            .filter_map(|key| numeric_suffix(&prefix, key))
            .filter_map(|n| n.checked_add(1))
            .max()
            .unwrap_or(1);

        Self {
            next: Some(seed),
            prefix,
            reserved,
        }
    }

    /// Зарезервировать явный ключ из файла, чтобы генератор его не выдал
    pub fn reserve(&mut self, key: &str) {
        self.reserved.insert(key.to_string());
    }

    /// Явный непустой ключ возвращается как есть (коллизию решает API),
    /// иначе генерируется следующий свободный
    pub fn assign(&mut self, explicit: Option<&str>) -> Result<String, KeysExhausted> {
        if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
            self.reserved.insert(key.to_string());
            return Ok(key.to_string());
        }

        // Каждая итерация сдвигает счетчик, так что цикл конечен
        while let Some(n) = self.next {
            self.next = n.checked_add(1);
            let candidate = format!("{}{}", self.prefix, n);
            if self.reserved.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }

        Err(KeysExhausted {
            prefix: self.prefix.clone(),
        })
    }

    #[cfg(test)]
    fn next_counter(&self) -> Option<u64> {
        self.next
    }
}

/// Номер из ключа `<prefix><цифры>`; остальное (буквы, знак, переполнение) - None
fn numeric_suffix(prefix: &str, key: &str) -> Option<u64> {
    let digits = key.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok()
}
