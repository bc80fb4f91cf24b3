use std::collections::HashMap;
use std::sync::LazyLock;

/// Weight for words missing from the table.
pub const DEFAULT_FREQUENCY: u32 = 1;

/// Common English words, weighted so everyday vocabulary sorts first.
#[rustfmt::skip]
const WORD_FREQUENCY: &[(&str, u32)] = &[
    ("the", 100), ("be", 99), ("to", 98), ("of", 97), ("and", 96), ("a", 95),
    ("in", 94), ("that", 93), ("have", 92), ("i", 91), ("it", 90), ("for", 89),
    ("not", 88), ("on", 87), ("with", 86), ("he", 85), ("as", 84), ("you", 83),
    ("do", 82), ("at", 81), ("this", 80), ("but", 79), ("his", 78), ("by", 77),
    ("from", 76), ("they", 75), ("we", 74), ("say", 73), ("her", 72), ("she", 71),
    ("or", 70), ("an", 69), ("will", 68), ("my", 67), ("one", 66), ("all", 65),
    ("would", 64), ("there", 63), ("their", 62), ("what", 61), ("so", 60),
    ("up", 59), ("out", 58), ("if", 57), ("about", 56), ("who", 55), ("get", 54),
    ("which", 53), ("go", 52), ("me", 51), ("when", 50), ("make", 49), ("can", 48),
    ("like", 47), ("time", 46), ("no", 45), ("just", 44), ("him", 43), ("know", 42),
    ("take", 41), ("people", 40), ("into", 39), ("year", 38), ("your", 37),
    ("good", 36), ("some", 35), ("could", 34), ("them", 33), ("see", 32),
    ("other", 31), ("than", 30), ("then", 29), ("now", 28), ("look", 27),
    ("only", 26), ("come", 25), ("its", 24), ("over", 23), ("think", 22),
    ("also", 21), ("back", 20), ("after", 19), ("use", 18), ("two", 17),
    ("how", 16), ("our", 15), ("work", 14), ("first", 13), ("well", 12),
    ("way", 11), ("even", 10), ("new", 9), ("want", 8), ("because", 7), ("any", 6),
    ("these", 5), ("give", 4), ("day", 3), ("most", 2), ("us", 1),
    ("house", 45), ("water", 44), ("food", 43), ("money", 42), ("school", 41),
    ("family", 40), ("friend", 39), ("love", 38), ("life", 37), ("world", 36),
    ("place", 35), ("hand", 34), ("part", 33), ("child", 32), ("eye", 31),
    ("woman", 30), ("man", 29), ("week", 28), ("case", 27), ("point", 26),
    ("government", 25), ("company", 24), ("number", 23), ("group", 22),
    ("problem", 21), ("fact", 20),
    ("game", 35), ("play", 34), ("win", 33), ("lose", 32), ("team", 31),
    ("score", 30), ("round", 29), ("turn", 28), ("word", 27), ("letter", 26),
    ("sound", 25), ("music", 24), ("song", 23), ("dance", 22), ("party", 21),
    ("fun", 20), ("happy", 19), ("laugh", 18),
    ("run", 35), ("walk", 34), ("talk", 33), ("speak", 32), ("listen", 31),
    ("hear", 30), ("watch", 29), ("read", 28), ("write", 27), ("learn", 26),
    ("teach", 25), ("study", 24), ("help", 23), ("sleep", 20), ("eat", 19),
    ("drink", 18),
    ("car", 35), ("book", 34), ("phone", 33), ("computer", 32), ("table", 31),
    ("chair", 30), ("door", 29), ("window", 28), ("room", 27), ("kitchen", 26),
    ("bathroom", 25), ("bedroom", 24), ("garden", 23), ("street", 22),
    ("city", 21), ("country", 20), ("building", 19),
    ("red", 25), ("blue", 24), ("green", 23), ("yellow", 22), ("black", 21),
    ("white", 20), ("orange", 19), ("purple", 18), ("pink", 17), ("brown", 16),
    ("gray", 15), ("grey", 15),
    ("three", 38), ("four", 37), ("five", 36), ("six", 35), ("seven", 34),
    ("eight", 33), ("nine", 32), ("ten", 31),
    ("monday", 20), ("tuesday", 19), ("wednesday", 18), ("thursday", 17),
    ("friday", 16), ("saturday", 15), ("sunday", 14),
    ("morning", 25), ("afternoon", 24), ("evening", 23), ("night", 22),
    ("today", 21), ("tomorrow", 20), ("yesterday", 19),
    ("dog", 30), ("cat", 29), ("bird", 28), ("fish", 27), ("horse", 26),
    ("cow", 25), ("pig", 24), ("chicken", 23), ("mouse", 22), ("lion", 21),
    ("head", 30), ("face", 29), ("nose", 28), ("mouth", 27), ("teeth", 26),
    ("hair", 25), ("neck", 24), ("shoulder", 23), ("arm", 22), ("finger", 20),
    ("chest", 19), ("leg", 17), ("foot", 16), ("toe", 15),
    ("sun", 25), ("rain", 24), ("snow", 23), ("wind", 22), ("cloud", 21),
    ("storm", 20), ("hot", 19), ("cold", 18), ("warm", 17), ("cool", 16),
];

static FREQUENCY_TABLE: LazyLock<HashMap<&'static str, u32>> =
    LazyLock::new(|| WORD_FREQUENCY.iter().copied().collect());

/// Case-insensitive frequency weight.
pub fn word_frequency(word: &str) -> u32 {
    let lower = word.to_lowercase();
    FREQUENCY_TABLE
        .get(lower.as_str())
        .copied()
        .unwrap_or(DEFAULT_FREQUENCY)
}
