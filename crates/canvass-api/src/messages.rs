//! Localized user-facing messages.
//!
//! Lookups walk a [`FallbackChain`]; English is complete, so the chain
//! always ends in a hit for known keys.

use canvass_core::language::{DEFAULT_LANGUAGE, FallbackChain};

fn en(key: &str) -> Option<&'static str> {
    Some(match key {
        "errors.not_found" => "The requested resource was not found.",
        "errors.conflict" => "A record with the same value already exists.",
        "errors.invalid_credentials" => "Invalid email or password.",
        "errors.inactive_account" => "This account is not active.",
        "errors.invalid_or_expired_token" => "The link is invalid or has expired.",
        "errors.password_mismatch" => "The password confirmation does not match.",
        "errors.validation" => "The request contains invalid data.",
        "errors.dependency_failure" => "An external service is unavailable. Please try again later.",
        "errors.unauthorized" => "Authentication is required.",
        "errors.forbidden" => "You do not have permission to perform this action.",
        "errors.tenant_context" => "The tenant is missing or unknown.",
        "errors.internal" => "An unexpected error occurred.",
        "auth.reset_requested" => {
            "If an account exists for that email, a reset link has been sent."
        }
        _ => return None,
    })
}

fn es(key: &str) -> Option<&'static str> {
    Some(match key {
        "errors.not_found" => "No se encontró el recurso solicitado.",
        "errors.conflict" => "Ya existe un registro con el mismo valor.",
        "errors.invalid_credentials" => "Correo electrónico o contraseña no válidos.",
        "errors.inactive_account" => "Esta cuenta no está activa.",
        "errors.invalid_or_expired_token" => "El enlace no es válido o ha caducado.",
        "errors.password_mismatch" => "La confirmación de la contraseña no coincide.",
        "errors.validation" => "La solicitud contiene datos no válidos.",
        "errors.dependency_failure" => {
            "Un servicio externo no está disponible. Inténtalo de nuevo más tarde."
        }
        "errors.unauthorized" => "Se requiere autenticación.",
        "errors.forbidden" => "No tienes permiso para realizar esta acción.",
        "errors.tenant_context" => "Falta el inquilino o es desconocido.",
        "errors.internal" => "Se produjo un error inesperado.",
        "auth.reset_requested" => {
            "Si existe una cuenta con ese correo, se ha enviado un enlace de restablecimiento."
        }
        _ => return None,
    })
}

fn fr(key: &str) -> Option<&'static str> {
    Some(match key {
        "errors.not_found" => "La ressource demandée est introuvable.",
        "errors.conflict" => "Un enregistrement avec la même valeur existe déjà.",
        "errors.invalid_credentials" => "Adresse e-mail ou mot de passe invalide.",
        "errors.inactive_account" => "Ce compte n'est pas actif.",
        "errors.invalid_or_expired_token" => "Le lien est invalide ou a expiré.",
        "errors.password_mismatch" => "La confirmation du mot de passe ne correspond pas.",
        "errors.validation" => "La requête contient des données invalides.",
        "errors.unauthorized" => "Une authentification est requise.",
        "errors.forbidden" => "Vous n'avez pas l'autorisation d'effectuer cette action.",
        "errors.internal" => "Une erreur inattendue s'est produite.",
        _ => return None,
    })
}

fn de(key: &str) -> Option<&'static str> {
    Some(match key {
        "errors.not_found" => "Die angeforderte Ressource wurde nicht gefunden.",
        "errors.conflict" => "Ein Eintrag mit demselben Wert existiert bereits.",
        "errors.invalid_credentials" => "Ungültige E-Mail-Adresse oder ungültiges Passwort.",
        "errors.inactive_account" => "Dieses Konto ist nicht aktiv.",
        "errors.invalid_or_expired_token" => "Der Link ist ungültig oder abgelaufen.",
        "errors.password_mismatch" => "Die Passwortbestätigung stimmt nicht überein.",
        "errors.validation" => "Die Anfrage enthält ungültige Daten.",
        "errors.unauthorized" => "Anmeldung erforderlich.",
        "errors.internal" => "Ein unerwarteter Fehler ist aufgetreten.",
        _ => return None,
    })
}

/// Message for `key` in exactly `lang`, if the catalog has one.
pub fn lookup(lang: &str, key: &str) -> Option<&'static str> {
    match lang {
        "en" => en(key),
        "es" => es(key),
        "fr" => fr(key),
        "de" => de(key),
        _ => None,
    }
}

/// Message for `key` in the first language of `chain` that has it,
/// together with that language. Unknown keys yield an empty message.
pub fn localize(chain: &FallbackChain, key: &str) -> (&'static str, String) {
    chain
        .iter()
        .find_map(|lang| lookup(lang, key).map(|msg| (msg, lang.to_string())))
        .unwrap_or_else(|| ("", DEFAULT_LANGUAGE.to_string()))
}
