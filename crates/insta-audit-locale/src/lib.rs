#![warn(missing_docs)]
//! # insta-audit-locale
//!
//! Static display strings for every supported [`Language`]. Pure data; the
//! only logic is the lookup.

use insta_audit_core::{Language, Severity};

/// Display strings for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strings {
    /// Product title shown in the header.
    pub title: &'static str,
    /// Small badge above the hero title.
    pub subtitle: &'static str,
    /// Hero headline.
    pub hero_title: &'static str,
    /// Hero description.
    pub hero_desc: &'static str,
    /// Instagram tab label.
    pub platform_ig: &'static str,
    /// TikTok tab label.
    pub platform_tt: &'static str,
    /// Username input label.
    pub input_username_label: &'static str,
    /// Username input placeholder.
    pub input_username_placeholder: &'static str,
    /// Niche input label.
    pub input_niche_label: &'static str,
    /// Niche input placeholder.
    pub input_niche_placeholder: &'static str,
    /// Submit button label.
    pub analyze_btn: &'static str,
    /// Submit button label while a request is in flight.
    pub analyzing: &'static str,
    /// Generic failure message shown above the form.
    pub error_msg: &'static str,
    /// Caption under the score.
    pub score: &'static str,
    /// Bio critique heading.
    pub bio_audit: &'static str,
    /// Visual critique heading.
    pub visual_audit: &'static str,
    /// Content strategy heading.
    pub content_audit: &'static str,
    /// Problems section heading.
    pub problems_title: &'static str,
    /// Solutions section heading.
    pub solutions_title: &'static str,
    /// Hashtags section heading.
    pub hashtags_title: &'static str,
    /// High severity badge.
    pub high: &'static str,
    /// Medium severity badge.
    pub medium: &'static str,
    /// Low severity badge.
    pub low: &'static str,
    /// Button that discards the report.
    pub reset_btn: &'static str,
    /// Footer line.
    pub footer: &'static str,
    /// Lock overlay heading.
    pub lock_title: &'static str,
    /// Lock overlay description.
    pub lock_desc: &'static str,
    /// Lock overlay button.
    pub lock_btn: &'static str,
    /// Cookie banner text.
    pub cookie_text: &'static str,
    /// Cookie banner accept button.
    pub cookie_accept: &'static str,
}

const EN: Strings = Strings {
    title: "InstaAudit",
    subtitle: "AI Growth Audit",
    hero_title: "Why isn't your account growing?",
    hero_desc: "Enter your username and niche. Our AI audits your profile and tells you exactly what to fix.",
    platform_ig: "Instagram",
    platform_tt: "TikTok",
    input_username_label: "Username or profile link",
    input_username_placeholder: "your.username",
    input_niche_label: "Niche / account description",
    input_niche_placeholder: "e.g. sustainable fashion reselling, home workouts for beginners...",
    analyze_btn: "Analyze my account",
    analyzing: "Analyzing...",
    error_msg: "Something went wrong while analyzing. Please try again.",
    score: "Score",
    bio_audit: "Bio",
    visual_audit: "Visuals",
    content_audit: "Content strategy",
    problems_title: "What is holding you back",
    solutions_title: "How to fix it",
    hashtags_title: "Recommended hashtags",
    high: "High",
    medium: "Medium",
    low: "Low",
    reset_btn: "Analyze another account",
    footer: "Built for creators who want to grow.",
    lock_title: "Unlock the free audit",
    lock_desc: "Follow our account to unlock the tool. It takes one click.",
    lock_btn: "Follow & unlock",
    cookie_text: "We use local storage to remember your preferences.",
    cookie_accept: "OK",
};

const AR: Strings = Strings {
    title: "InstaAudit",
    subtitle: "تدقيق النمو بالذكاء الاصطناعي",
    hero_title: "لماذا لا ينمو حسابك؟",
    hero_desc: "أدخل اسم المستخدم ومجالك. سيقوم الذكاء الاصطناعي بتدقيق حسابك وإخبارك بما يجب إصلاحه.",
    platform_ig: "انستغرام",
    platform_tt: "تيك توك",
    input_username_label: "اسم المستخدم أو رابط الحساب",
    input_username_placeholder: "your.username",
    input_niche_label: "المجال / وصف الحساب",
    input_niche_placeholder: "مثال: بيع الأزياء المستدامة، تمارين منزلية للمبتدئين...",
    analyze_btn: "حلّل حسابي",
    analyzing: "جارٍ التحليل...",
    error_msg: "حدث خطأ أثناء التحليل. يرجى المحاولة مرة أخرى.",
    score: "النتيجة",
    bio_audit: "النبذة",
    visual_audit: "الهوية البصرية",
    content_audit: "استراتيجية المحتوى",
    problems_title: "ما الذي يعيقك",
    solutions_title: "كيف تصلح ذلك",
    hashtags_title: "الهاشتاغات المقترحة",
    high: "عالي",
    medium: "متوسط",
    low: "منخفض",
    reset_btn: "حلّل حساباً آخر",
    footer: "صُمم لصنّاع المحتوى الذين يريدون النمو.",
    lock_title: "افتح التدقيق المجاني",
    lock_desc: "تابع حسابنا لفتح الأداة. نقرة واحدة فقط.",
    lock_btn: "تابع وافتح",
    cookie_text: "نستخدم التخزين المحلي لتذكر تفضيلاتك.",
    cookie_accept: "موافق",
};

const HE: Strings = Strings {
    title: "InstaAudit",
    subtitle: "בדיקת צמיחה מבוססת AI",
    hero_title: "למה החשבון שלך לא צומח?",
    hero_desc: "הזינו שם משתמש ותחום. ה-AI יבדוק את הפרופיל ויגיד לכם בדיוק מה לתקן.",
    platform_ig: "אינסטגרם",
    platform_tt: "טיקטוק",
    input_username_label: "שם משתמש או קישור לפרופיל",
    input_username_placeholder: "your.username",
    input_niche_label: "תחום / תיאור החשבון",
    input_niche_placeholder: "לדוגמה: מכירת אופנה בת-קיימא, אימונים ביתיים למתחילים...",
    analyze_btn: "נתחו את החשבון שלי",
    analyzing: "מנתח...",
    error_msg: "משהו השתבש בזמן הניתוח. נסו שוב.",
    score: "ציון",
    bio_audit: "ביו",
    visual_audit: "ויזואליות",
    content_audit: "אסטרטגיית תוכן",
    problems_title: "מה עוצר אתכם",
    solutions_title: "איך מתקנים",
    hashtags_title: "האשטגים מומלצים",
    high: "גבוה",
    medium: "בינוני",
    low: "נמוך",
    reset_btn: "נתחו חשבון נוסף",
    footer: "נבנה עבור יוצרים שרוצים לצמוח.",
    lock_title: "פתחו את הבדיקה החינמית",
    lock_desc: "עקבו אחרי החשבון שלנו כדי לפתוח את הכלי. לחיצה אחת בלבד.",
    lock_btn: "עקבו ופתחו",
    cookie_text: "אנו משתמשים באחסון מקומי כדי לזכור את ההעדפות שלכם.",
    cookie_accept: "אישור",
};

/// Returns the string table for `language`.
pub fn strings(language: Language) -> &'static Strings {
    match language {
        Language::Ar => &AR,
        Language::En => &EN,
        Language::He => &HE,
    }
}

/// Returns the localized badge for `severity`.
pub fn severity_label(language: Language, severity: Severity) -> &'static str {
    let table = strings(language);
    match severity {
        Severity::High => table.high,
        Severity::Medium => table.medium,
        Severity::Low => table.low,
    }
}

/// Returns the native name shown in the language menu.
pub fn native_language_name(language: Language) -> &'static str {
    match language {
        Language::Ar => "العربية",
        Language::En => "English",
        Language::He => "עברית",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_has_non_empty_core_strings() {
        for language in Language::ALL {
            let table = strings(language);
            for value in [
                table.error_msg,
                table.lock_btn,
                table.cookie_accept,
                table.analyze_btn,
                table.reset_btn,
            ] {
                assert!(!value.trim().is_empty(), "{language} has a blank string");
            }
        }
    }

    #[test]
    fn severity_labels_are_localized() {
        assert_eq!(severity_label(Language::En, Severity::High), "High");
        assert_ne!(
            severity_label(Language::Ar, Severity::High),
            severity_label(Language::En, Severity::High)
        );
    }
}
