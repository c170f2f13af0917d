//! Simplified/Traditional Chinese text toggling.
//!
//! The actual script mapping is an external capability behind
//! [`ScriptConverter`]; [`CharTableConverter`] is a small built-in table for
//! when nothing better is plugged in.

pub mod cache;
pub mod toggle;

use std::collections::HashMap;

pub use self::cache::{TextConversionCache, TextSnapshot};
pub use self::toggle::LanguageToggle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Simplified,
    Traditional,
}

impl Variant {
    pub fn other(self) -> Variant {
        match self {
            Variant::Simplified => Variant::Traditional,
            Variant::Traditional => Variant::Simplified,
        }
    }

    /// Locale tag handed to the conversion capability.
    pub fn tag(self) -> &'static str {
        match self {
            Variant::Simplified => "cn",
            Variant::Traditional => "hk",
        }
    }

    pub fn label(self) -> ToggleLabel {
        match self {
            Variant::Simplified => ToggleLabel {
                text: "简体中文",
                title: "当前为简体中文，切换为繁体中文",
            },
            Variant::Traditional => ToggleLabel {
                text: "繁體中文",
                title: "當前為繁體中文，切換為簡體中文",
            },
        }
    }
}

/// Label text and button tooltip for the variant currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleLabel {
    pub text: &'static str,
    pub title: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    Original,
    Converted,
}

/// One direction of script conversion.
pub type Converter<'a> = Box<dyn FnMut(&str) -> String + 'a>;

/// Conversion capability. A fresh converter is built for every direction
/// change.
pub trait ScriptConverter {
    fn converter(&self, from: Variant, to: Variant) -> Converter<'_>;
}

// One representative character per pair, used for detection.
const DETECTION_PAIRS: &[(char, char)] = &[
    ('个', '個'),
    ('简', '簡'),
    ('么', '麼'),
    ('国', '國'),
    ('这', '這'),
    ('没', '沒'),
    ('图', '圖'),
];

/// Guess which variant `text` is written in.
///
/// Counts how many representative characters of each side are present at
/// least once. Ties go to Traditional.
pub fn detect_variant(text: &str) -> Variant {
    let simplified = DETECTION_PAIRS
        .iter()
        .filter(|(s, _)| text.contains(*s))
        .count();
    let traditional = DETECTION_PAIRS
        .iter()
        .filter(|(_, t)| text.contains(*t))
        .count();
    log::debug!(
        "Variant votes: simplified={} traditional={}",
        simplified,
        traditional
    );
    if traditional >= simplified {
        Variant::Traditional
    } else {
        Variant::Simplified
    }
}

#[rustfmt::skip]
const CHAR_TABLE: &[(char, char)] = &[
    ('个', '個'), ('简', '簡'), ('么', '麼'), ('国', '國'), ('这', '這'),
    ('没', '沒'), ('图', '圖'), ('体', '體'), ('当', '當'), ('为', '為'),
    ('换', '換'), ('们', '們'), ('来', '來'), ('时', '時'), ('说', '說'),
    ('会', '會'), ('对', '對'), ('发', '發'), ('后', '後'), ('开', '開'),
    ('关', '關'), ('动', '動'), ('学', '學'), ('书', '書'), ('写', '寫'),
    ('读', '讀'), ('语', '語'), ('话', '話'), ('网', '網'), ('页', '頁'),
    ('点', '點'), ('电', '電'), ('脑', '腦'), ('长', '長'), ('门', '門'),
    ('问', '問'), ('间', '間'), ('题', '題'), ('经', '經'), ('过', '過'),
    ('还', '還'), ('进', '進'), ('远', '遠'), ('边', '邊'), ('记', '記'),
    ('设', '設'), ('计', '計'), ('认', '認'), ('识', '識'), ('让', '讓'),
    ('请', '請'), ('谢', '謝'), ('欢', '歡'), ('乐', '樂'), ('爱', '愛'),
    ('亲', '親'), ('见', '見'), ('观', '觀'), ('现', '現'), ('实', '實'),
    ('应', '應'), ('该', '該'), ('与', '與'), ('东', '東'), ('车', '車'),
    ('马', '馬'), ('鱼', '魚'), ('鸟', '鳥'), ('风', '風'), ('云', '雲'),
    ('气', '氣'), ('岁', '歲'), ('万', '萬'), ('无', '無'), ('从', '從'),
    ('众', '眾'), ('华', '華'), ('业', '業'), ('专', '專'), ('术', '術'),
    ('码', '碼'), ('链', '鏈'),
];

/// Character-for-character table converter.
///
/// Covers common pairs only; characters outside the table pass through.
#[derive(Debug, Clone)]
pub struct CharTableConverter {
    to_traditional: HashMap<char, char>,
    to_simplified: HashMap<char, char>,
}

impl Default for CharTableConverter {
    fn default() -> Self {
        let mut to_traditional = HashMap::new();
        let mut to_simplified = HashMap::new();
        for &(s, t) in CHAR_TABLE {
            to_traditional.insert(s, t);
            to_simplified.insert(t, s);
        }
        Self {
            to_traditional,
            to_simplified,
        }
    }
}

impl ScriptConverter for CharTableConverter {
    fn converter(&self, from: Variant, to: Variant) -> Converter<'_> {
        log::debug!("Building converter {} -> {}", from.tag(), to.tag());
        let table = match (from, to) {
            (Variant::Simplified, Variant::Traditional) => Some(&self.to_traditional),
            (Variant::Traditional, Variant::Simplified) => Some(&self.to_simplified),
            _ => None,
        };
        let Some(table) = table else {
            return Box::new(|text: &str| text.to_string());
        };
        Box::new(move |text: &str| {
            text.chars()
                .map(|c| table.get(&c).copied().unwrap_or(c))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_traditional_beats_one_simplified() {
        assert_eq!(detect_variant("這個國家沒有 图"), Variant::Traditional);
    }

    #[test]
    fn simplified_majority() {
        assert_eq!(detect_variant("这个国家没有地图"), Variant::Simplified);
    }

    #[test]
    fn tie_goes_to_traditional() {
        assert_eq!(detect_variant("hello world"), Variant::Traditional);
        assert_eq!(detect_variant("个 個"), Variant::Traditional);
    }

    #[test]
    fn presence_not_frequency() {
        // Five copies of one simplified char still count once.
        assert_eq!(detect_variant("国国国国国 這個"), Variant::Traditional);
    }

    #[test]
    fn table_converts_both_ways() {
        let table = CharTableConverter::default();
        let mut to_t = table.converter(Variant::Simplified, Variant::Traditional);
        assert_eq!(to_t("这个网站"), "這個網站");
        let mut to_s = table.converter(Variant::Traditional, Variant::Simplified);
        assert_eq!(to_s("這個網站 ok"), "这个网站 ok");
    }

    #[test]
    fn labels_follow_variant() {
        assert_eq!(Variant::Simplified.label().text, "简体中文");
        assert_eq!(Variant::Traditional.label().text, "繁體中文");
        assert_eq!(Variant::Traditional.other(), Variant::Simplified);
        assert_eq!(Variant::Simplified.tag(), "cn");
    }
}
