//! Language table used by the prompt builder.
//!
//! Each entry carries the exact localized sentences the service is given:
//! an expertise statement and a rule forcing the answer language. Codes not
//! listed here still work through the generic fallback in
//! [`crate::prompt`].

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    /// English display name
    pub name: &'static str,
    pub expertise: &'static str,
    pub response_rule: &'static str
}

impl Language {
    pub fn system_instruction(&self) -> String {
        format!("{} {}", self.expertise, self.response_rule)
    }
}

const fn lang(
    code: &'static str,
    name: &'static str,
    expertise: &'static str,
    response_rule: &'static str
) -> Language {
    Language {
        code,
        name,
        expertise,
        response_rule
    }
}

pub static LANGUAGES: &[Language] = &[
    lang("ar", "Arabic", "أنت خبير في اللغة الصينية الكلاسيكية.", "الرجاء الرد باللغة العربية فقط"),
    lang("bn", "Bengali", "আপনি একজন ক্লাসিক্যাল চাইনিজ ভাষার বিশেষজ্ঞ।", "অনুগ্রহ করে শুধুমাত্র বাংলায় উত্তর দিন"),
    lang("bg", "Bulgarian", "Вие сте експерт по класически китайски език.", "Моля, отговорете само на български"),
    lang("zh", "Chinese", "你是一位专业的古文解读专家。", "请使用中文回答"),
    lang("hr", "Croatian", "Vi ste stručnjak za klasični kineski jezik.", "Molimo odgovorite samo na hrvatskom"),
    lang("cs", "Czech", "Jste odborník na klasickou čínštinu.", "Prosím, odpovězte pouze v češtině"),
    lang("da", "Danish", "Du er en ekspert i klassisk kinesisk.", "Svar venligst kun på dansk"),
    lang("nl", "Dutch", "U bent een expert in klassiek Chinees.", "Antwoord alstublieft alleen in het Nederlands"),
    lang("en", "English", "You are a professional classical Chinese expert.", "Please respond in English only"),
    lang("et", "Estonian", "Olete klassikalise hiina keele ekspert.", "Palun vastake ainult eesti keeles"),
    lang("fi", "Finnish", "Olet ammattitaitoinen klassisen kiinan kielen asiantuntija.", "Vastaa vain suomeksi"),
    lang("fr", "French", "Vous êtes un expert en chinois classique.", "Veuillez répondre en français uniquement"),
    lang("de", "German", "Sie sind ein Experte für klassisches Chinesisch.", "Bitte antworten Sie nur auf Deutsch"),
    lang("el", "Greek", "Είστε ειδικός στην κλασική κινεζική γλώσσα.", "Παρακαλώ απαντήστε μόνο στα ελληνικά"),
    lang("iw", "Hebrew", "אתה מומחה בסינית קלאסית.", "אנא ענה רק בעברית"),
    lang("hi", "Hindi", "आप क्लासिक चीनी भाषा के विशेषज्ञ हैं।", "कृपया केवल हिंदी में उत्तर दें"),
    lang("hu", "Hungarian", "Ön egy klasszikus kínai nyelv szakértője.", "Kérjük, válaszoljon csak magyarul"),
    lang("id", "Indonesian", "Anda adalah ahli bahasa Cina klasik.", "Silakan jawab hanya dalam bahasa Indonesia"),
    lang("it", "Italian", "Sei un esperto di cinese classico.", "Si prega di rispondere solo in italiano"),
    lang("ja", "Japanese", "あなたは古典中国語の専門家です。", "日本語で回答してください"),
    lang("ko", "Korean", "당신은 전문적인 중국 고전 해석 전문가입니다.", "한국어로 답변해 주세요"),
    lang("lv", "Latvian", "Jūs esat klasiskās ķīniešu valodas eksperts.", "Lūdzu atbildiet tikai latviešu valodā"),
    lang("lt", "Lithuanian", "Jūs esate klasikinės kinų kalbos ekspertas.", "Prašome atsakyti tik lietuvių kalba"),
    lang("no", "Norwegian", "Du er en ekspert på klassisk kinesisk.", "Vennligst svar kun på norsk"),
    lang("pl", "Polish", "Jesteś ekspertem w klasycznym języku chińskim.", "Proszę odpowiadać tylko w języku polskim"),
    lang("pt", "Portuguese", "Você é um especialista em chinês clássico.", "Por favor, responda apenas em português"),
    lang("ro", "Romanian", "Sunteți un expert în limba chineză clasică.", "Vă rugăm să răspundeți doar în română"),
    lang("ru", "Russian", "Вы являетесь экспертом по классическому китайскому языку.", "Пожалуйста, отвечайте только на русском языке"),
    lang("sr", "Serbian", "Ви сте стручњак за класични кинески језик.", "Молимо одговорите само на српском"),
    lang("sk", "Slovak", "Ste odborník na klasickú čínštinu.", "Prosím, odpovedzte len po slovensky"),
    lang("sl", "Slovenian", "Strokovnjak ste za klasično kitajščino.", "Prosim, odgovorite samo v slovenščini"),
    lang("es", "Spanish", "Eres un experto en chino clásico.", "Por favor, responda solo en español"),
    lang("sw", "Swahili", "Wewe ni mtaalam wa Kisini cha kale.", "Tafadhali jibu kwa Kiswahili tu"),
    lang("sv", "Swedish", "Du är en expert på klassisk kinesiska.", "Vänligen svara endast på svenska"),
    lang("th", "Thai", "คุณเป็นผู้เชี่ยวชาญด้านภาษาจีนโบราณ", "กรุณาตอบเป็นภาษาไทยเท่านั้น"),
    lang("tr", "Turkish", "Klasik Çince konusunda uzmansınız.", "Lütfen sadece Türkçe yanıt verin"),
    lang("uk", "Ukrainian", "Ви є експертом з класичної китайської мови.", "Будь ласка, відповідайте тільки українською мовою"),
    lang("vi", "Vietnamese", "Bạn là chuyên gia về tiếng Trung cổ đại.", "Vui lòng chỉ trả lời bằng tiếng Việt"),
];

/// Trims and lowercases a caller-supplied code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Looks up a code case-insensitively.
pub fn lookup(code: &str) -> Option<&'static Language> {
    let code = normalize_code(code);
    LANGUAGES.iter().find(|lang| lang.code == code)
}

const GUIDE_ZH: &str = "# 字词解释
（解释重要字词的含义）

# 整体翻译
（用现代汉语翻译全文）

# 深入解读
（分析这段话的思想内涵和现实意义）

# 相关典故
（详细说明与这段文字相关的历史背景、典故和影响）";

const GUIDE_EN: &str = "# Word Analysis
(Explain the meaning of key words and phrases)

# Complete Translation
(Provide a complete translation of the text)

# In-depth Interpretation
(Analyze the philosophical meaning and practical significance)

# Historical Context
(Explain the historical background, allusions, and influence)";

const GUIDE_JA: &str = "# 単語と語句の解説
（重要な単語や語句の意味を説明）

# 全文翻訳
（全文を現代日本語に翻訳）

# 詳細な解釈
（この文章の思想的な意味と現実的な意義を分析）

# 関連する故事
（この文章に関連する歴史的背景、故事、影響について詳しく説明）";

const GUIDE_KO: &str = "# 단어 분석
(중요한 단어와 구문의 의미 설명)

# 전체 번역
(전문을 현대 한국어로 번역)

# 심층 해석
(이 문장의 사상적 의미와 현실적 의의 분석)

# 관련 고사
(이 문장과 관련된 역사적 배경, 고사, 영향에 대한 상세 설명)";

const GUIDE_FR: &str = "# Analyse des mots
(Expliquer le sens des mots et expressions clés)

# Traduction complète
(Fournir une traduction complète du texte)

# Interprétation approfondie
(Analyser la signification philosophique et l'importance pratique)

# Contexte historique
(Expliquer le contexte historique, les allusions et l'influence)";

const GUIDE_DE: &str = "# Wortanalyse
(Erklärung der Bedeutung wichtiger Wörter und Phrasen)

# Vollständige Übersetzung
(Vollständige Übersetzung des Textes)

# Tiefgehende Interpretation
(Analyse der philosophischen Bedeutung und praktischen Relevanz)

# Historischer Kontext
(Erklärung des historischen Hintergrunds, Anspielungen und Einflüsse)";

const GUIDE_ES: &str = "# Análisis de palabras
(Explicar el significado de palabras y frases clave)

# Traducción completa
(Proporcionar una traducción completa del texto)

# Interpretación profunda
(Analizar el significado filosófico y la importancia práctica)

# Contexto histórico
(Explicar el contexto histórico, alusiones e influencias)";

const GUIDE_IT: &str = "# Analisi delle parole
(Spiegare il significato di parole e frasi chiave)

# Traduzione completa
(Fornire una traduzione completa del testo)

# Interpretazione approfondita
(Analizzare il significato filosofico e l'importanza pratica)

# Contesto storico
(Spiegare il contesto storico, le allusioni e le influenze)";

const GUIDE_RU: &str = "# Анализ слов
(Объяснение значения ключевых слов и фраз)

# Полный перевод
(Предоставление полного перевода текста)

# Глубокий анализ
(Анализ философского значения и практической значимости)

# Исторический контекст
(Объяснение исторического фона, аллюзий и влияния)";

const GUIDE_AR: &str = "# تحليل الكلمات
(شرح معنى الكلمات والعبارات الرئيسية)

# الترجمة الكاملة
(تقديم ترجمة كاملة للنص)

# التفسير العميق
(تحليل المعنى الفلسفي والأهمية العملية)

# السياق التاريخي
(شرح الخلفية التاريخية والإشارات والتأثيرات)";

const GUIDE_PL: &str = "# Analiza słów
(Wyjaśnienie znaczenia kluczowych słów i zwrotów)

# Pełne tłumaczenie
(Przekład całego tekstu)

# Szczegółowa interpretacja
(Analiza znaczenia filozoficznego i praktycznego)

# Kontekst historyczny
(Wyjaśnienie tła historycznego, aluzji i wpływów)";

/// The four-part guide template for a code. Codes without a localized
/// template get the English one.
pub fn guide_template(code: &str) -> &'static str {
    match normalize_code(code).as_str() {
        "zh" => GUIDE_ZH,
        "ja" => GUIDE_JA,
        "ko" => GUIDE_KO,
        "fr" => GUIDE_FR,
        "de" => GUIDE_DE,
        "es" => GUIDE_ES,
        "it" => GUIDE_IT,
        "ru" => GUIDE_RU,
        "ar" => GUIDE_AR,
        "pl" => GUIDE_PL,
        _ => GUIDE_EN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_has_unique_codes() {
        let codes: HashSet<_> = LANGUAGES.iter().map(|l| l.code).collect();
        assert_eq!(codes.len(), LANGUAGES.len());
        assert_eq!(LANGUAGES.len(), 38);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let lang = lookup("  JA ").unwrap();
        assert_eq!(lang.name, "Japanese");
        assert_eq!(lang.response_rule, "日本語で回答してください");
    }

    #[test]
    fn test_lookup_unknown_code() {
        assert!(lookup("xx").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_system_instruction_joins_sentences() {
        let lang = lookup("en").unwrap();
        assert_eq!(
            lang.system_instruction(),
            "You are a professional classical Chinese expert. Please respond in English only"
        );
    }

    #[test]
    fn test_guide_template_has_four_sections() {
        for lang in LANGUAGES {
            let template = guide_template(lang.code);
            let headings = template.lines().filter(|l| l.starts_with("# ")).count();
            assert_eq!(headings, 4, "template for {}", lang.code);
        }
    }

    #[test]
    fn test_guide_template_falls_back_to_english() {
        assert_eq!(guide_template("sv"), GUIDE_EN);
        assert_eq!(guide_template("unknown"), GUIDE_EN);
        assert_eq!(guide_template("ZH"), GUIDE_ZH);
    }
}
