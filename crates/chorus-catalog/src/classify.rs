//! Derived voice metadata: category, gender, and quality classifiers
//!
//! Gender is a heuristic lookup against curated name lists with an
//! `unknown` fallback, not authoritative. The lists are a data asset
//! carried over verbatim; changing them changes API output.

use crate::types::{Gender, Quality};

/// Character/celebrity voices, matched ahead of any language category
const CELEBRITY_VOICES: &[&str] = &["mrbeast", "snoop", "presidential"];

/// Language prefix → category label
const LANGUAGE_CATEGORIES: &[(&str, &str)] = &[
    ("en-", "english"),
    ("es-", "spanish"),
    ("fr-", "french"),
    ("de-", "german"),
    ("it-", "italian"),
    ("pt-", "portuguese"),
    ("ru-", "russian"),
    ("ja-", "japanese"),
    ("ko-", "korean"),
    ("zh-", "chinese"),
    ("ar-", "arabic"),
    ("hi-", "hindi"),
    ("th-", "thai"),
    ("vi-", "vietnamese"),
];

const FEMALE_NAMES: &[&str] = &[
    "tasha", "lisa", "emily", "jenny", "aria", "joanna", "mary", "salli", "joey", "sonia", "amy", "libby",
    "natasha", "freya", "olivia", "ezinne", "leah", "adri", "fatima", "hala", "rana", "tanishaa", "kalina",
    "joana", "xiaoxiao", "xiaomeng", "xiaoyan", "hiumaan", "hsiaochen", "hsiaoyu", "gabrijela", "vlasta",
    "christel", "colette", "laura", "dena", "anu", "blessica", "selma", "denise", "celeste", "sylvie",
    "charline", "ariane", "katja", "louisa", "vicki", "eka", "athina", "hila", "swara", "noemi", "gudrun",
    "gadis", "irma", "elsa", "palmira", "imelda", "bianca", "mayu", "nanami", "shiori", "aigul", "jimin",
    "ona", "everita", "yasmin", "hemkala", "iselin", "pernille", "dilara", "agnieszka", "zofia", "brenda",
    "yara", "leila", "camila", "fernanda", "ines", "alina", "dariya", "viktoria", "petra", "sameera",
    "thilini", "vera", "triana", "carlota", "larissa", "hillevi", "sofie", "rehema", "pallavi", "saranya",
    "kani", "venba", "shruti", "premwadee", "emel", "gul", "uzma", "polina", "hoaimy", "orla",
];

const MALE_NAMES: &[&str] = &[
    "henry", "cliff", "guy", "jane", "matthew", "benwilson", "kyle", "kristy", "oliver", "joe", "george",
    "rob", "russell", "benjamin", "nate", "ryan", "michael", "thomas", "brian", "william", "ken", "abeo",
    "luke", "willem", "hamdan", "bassel", "bashkar", "borislav", "enric", "yunfeng", "yunjian", "yunze",
    "zhiyu", "wanlung", "hiujin", "yunjhe", "srecko", "antonin", "jeppe", "maarten", "ruben", "arnaud",
    "kert", "angelo", "harri", "henri", "claude", "jean", "gerard", "fabrice", "christoph", "conrad",
    "daniel", "giorgi", "nestoras", "avri", "madhur", "tamas", "gunnar", "ardi", "benigno", "gianni",
    "diego", "cataldo", "adriano", "naoki", "daichi", "keita", "daulet", "injoon", "bongjin", "leonas",
    "nils", "osman", "sagar", "finn", "farid", "marek", "donato", "fabio", "julio", "thiago", "duarte",
    "cristiano", "emil", "dmitry", "lukas", "rok", "kumar", "surya", "anbu", "mohan", "niwat", "ahmet",
    "salman", "asad", "ostap", "namminh", "colm",
];

/// Category for a voice: celebrity names take priority, then the language
/// prefix, then `other`
pub fn category_for(name: &str, language: &str) -> String {
    if CELEBRITY_VOICES.contains(&name) {
        return "celebrity".to_string();
    }

    LANGUAGE_CATEGORIES
        .iter()
        .find(|(prefix, _)| language.starts_with(prefix))
        .map_or_else(|| "other".to_string(), |(_, category)| (*category).to_string())
}

/// Estimated gender by case-insensitive name lookup
pub fn gender_for_name(name: &str) -> Gender {
    let name = name.to_lowercase();
    if FEMALE_NAMES.contains(&name.as_str()) {
        Gender::Female
    } else if MALE_NAMES.contains(&name.as_str()) {
        Gender::Male
    } else {
        Gender::Unknown
    }
}

/// Quality tier from the synthesis engine
pub fn quality_for_engine(engine: &str) -> Quality {
    match engine {
        "neural" | "resemble" => Quality::High,
        "standard" => Quality::Basic,
        _ => Quality::Medium,
    }
}
