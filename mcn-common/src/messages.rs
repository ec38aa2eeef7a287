//! Localized visitor-facing messages attached to core outcomes

use crate::i18n::Language;

/// Explanation shown when a detail page is blocked until the artwork is scanned
pub fn scan_required(language: Language) -> &'static str {
    match language {
        Language::Fr => "Scannez le QR code de l'œuvre ou saisissez son numéro pour découvrir son histoire.",
        Language::En => "Scan the artwork's QR code or enter its number to discover its story.",
        Language::Wo => "Scan QR code bi ci nataal bi walla dugalal nimero bi ngir gis seen taariix.",
    }
}

/// Call-to-action label leading back into scanning
pub fn scan_action(language: Language) -> &'static str {
    match language {
        Language::Fr => "Scanner un QR Code",
        Language::En => "Scan QR Code",
        Language::Wo => "Scan QR Code",
    }
}

/// Inline validation message for a code that matches no artwork
pub fn invalid_code(language: Language) -> &'static str {
    match language {
        Language::Fr => "Aucune œuvre ne correspond à ce code. Vérifiez le numéro et réessayez.",
        Language::En => "No artwork matches this code. Check the number and try again.",
        Language::Wo => "Amul nataal bu dëppoo ak code bii. Seetal nimero bi te jéemaat.",
    }
}

pub fn artwork_not_found(language: Language) -> &'static str {
    match language {
        Language::Fr => "Œuvre non trouvée",
        Language::En => "Artwork not found",
        Language::Wo => "Nataal bi amul",
    }
}

pub fn back_to_gallery(language: Language) -> &'static str {
    match language {
        Language::Fr => "Retour à la galerie",
        Language::En => "Back to gallery",
        Language::Wo => "Dellu ci nataal yi",
    }
}

pub fn route_not_found(language: Language) -> &'static str {
    match language {
        Language::Fr => "Parcours non trouvé",
        Language::En => "Route not found",
        Language::Wo => "Yoon bi amul",
    }
}

pub fn back_to_routes(language: Language) -> &'static str {
    match language {
        Language::Fr => "Retour aux parcours",
        Language::En => "Back to routes",
        Language::Wo => "Dellu ci yoon yi",
    }
}

/// One-time acknowledgment for completing a route
pub fn route_completed(language: Language) -> &'static str {
    match language {
        Language::Fr => "Félicitations ! Parcours terminé ! Vous avez gagné un badge !",
        Language::En => "Congratulations! Tour completed! You earned a badge!",
        Language::Wo => "Jaaxal ! Yoon bi jeex na ! Amoon nga badge !",
    }
}

/// First assistant message of a chat conversation
pub fn chat_welcome(language: Language) -> &'static str {
    match language {
        Language::Fr => "Bonjour ! Je suis votre guide virtuel du Musée des Civilisations Noires. Comment puis-je vous aider aujourd'hui ?",
        Language::En => "Hello! I'm your virtual guide at the Museum of Black Civilizations. How can I help you today?",
        Language::Wo => "Salaam aleekum! Maa ngi ci gëm-gëm bu Musée bu Yéenal Ñuul. Naka man a mën a dimbal la?",
    }
}

/// Transient notice when a chat message could not be delivered
pub fn chat_failed(language: Language) -> &'static str {
    match language {
        Language::Fr => "Impossible d'envoyer le message",
        Language::En => "Failed to send message",
        Language::Wo => "Dëkk wu-añ ci yónnë bataaxal",
    }
}

/// Transient notice when the camera cannot be used
pub fn camera_unavailable(language: Language) -> &'static str {
    match language {
        Language::Fr => "Caméra indisponible. Autorisez l'accès ou saisissez le numéro de l'œuvre.",
        Language::En => "Camera unavailable. Allow access or enter the artwork number.",
        Language::Wo => "Kamera bi mënul a liggéey. May ko walla dugalal nimero nataal bi.",
    }
}
