//! Localization of user-facing strings.
//!
//! Every message sent back to a client (errors, confirmations, labels) is a
//! [`Message`]: a dotted key plus named arguments. It is rendered into the
//! request locale by a [`Localizer`] at the edge of the HTTP layer, so the
//! services never need to know who they are talking to.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Languages offered to users
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
    De,
}

impl Locale {
    /// Offered languages, in preference order for ties
    pub const ALL: [Locale; 3] = [Locale::Fr, Locale::En, Locale::De];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::En => "en",
            Locale::De => "de",
        }
    }

    /// Key of the human readable language name
    pub fn label_key(&self) -> &'static str {
        match self {
            Locale::Fr => "label.locale.fr",
            Locale::En => "label.locale.en",
            Locale::De => "label.locale.de",
        }
    }

    /// Pick the best offered language from an `Accept-Language` header value.
    ///
    /// Entries are ranked by their `q` weight (default 1); only the primary
    /// subtag is compared, so `fr-CH` selects French. Wildcards and unknown
    /// languages are skipped.
    pub fn negotiate(accept_language: &str) -> Option<Locale> {
        let mut best: Option<(Locale, f32)> = None;

        for entry in accept_language.split(',') {
            let mut parts = entry.trim().split(';');
            let tag = parts.next().unwrap_or("").trim();
            let weight = parts
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);

            if weight <= 0.0 {
                continue;
            }

            let primary = tag.split('-').next().unwrap_or("");
            let Ok(locale) = primary.parse::<Locale>() else {
                continue;
            };

            match best {
                Some((_, w)) if w >= weight => {}
                _ => best = Some((locale, weight)),
            }
        }

        best.map(|(locale, _)| locale)
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fr" => Ok(Locale::Fr),
            "en" => Ok(Locale::En),
            "de" => Ok(Locale::De),
            _ => Err(format!("Unsupported locale: {}", s)),
        }
    }
}

/// A translatable message: key plus `{name}` substitutions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub key: Cow<'static, str>,
    pub args: Vec<(Cow<'static, str>, String)>,
}

impl Message {
    pub fn new(key: impl Into<Cow<'static, str>>) -> Self {
        Self {
            key: key.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<Cow<'static, str>>, value: impl ToString) -> Self {
        self.args.push((name.into(), value.to_string()));
        self
    }

    /// Render with a localizer
    pub fn render(&self, localizer: &dyn Localizer, locale: Locale) -> String {
        let args: Vec<(&str, &str)> = self
            .args
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_str()))
            .collect();
        localizer.t(locale, &self.key, &args)
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render(MessageCatalog::global(), Locale::En))
    }
}

/// Translates keys to localized strings
pub trait Localizer: Send + Sync + 'static {
    /// Translate `key` into `locale`, substituting `{name}` placeholders.
    fn t(&self, locale: Locale, key: &str, args: &[(&str, &str)]) -> String;

    /// Whether `key` has a translation in `locale` (not a fallback)
    fn is_translated(&self, locale: Locale, key: &str) -> bool;
}

/// Built-in string tables for French, English and German.
///
/// Lookup falls back to English, then to the key itself.
pub struct MessageCatalog {
    tables: HashMap<Locale, HashMap<&'static str, &'static str>>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        let tables = [(Locale::En, EN), (Locale::Fr, FR), (Locale::De, DE)]
            .into_iter()
            .map(|(locale, table)| (locale, table.iter().copied().collect()))
            .collect();
        Self { tables }
    }

    fn lookup(&self, locale: Locale, key: &str) -> Option<&'static str> {
        self.tables.get(&locale).and_then(|t| t.get(key)).copied()
    }

    /// Process-wide catalog
    pub fn global() -> &'static MessageCatalog {
        static CATALOG: std::sync::OnceLock<MessageCatalog> = std::sync::OnceLock::new();
        CATALOG.get_or_init(MessageCatalog::new)
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Localizer for MessageCatalog {
    fn t(&self, locale: Locale, key: &str, args: &[(&str, &str)]) -> String {
        let text = self
            .lookup(locale, key)
            .or_else(|| self.lookup(Locale::En, key))
            .unwrap_or(key);

        let mut result = text.to_string();
        for (name, value) in args {
            result = result.replace(&format!("{{{}}}", name), value);
        }
        result
    }

    fn is_translated(&self, locale: Locale, key: &str) -> bool {
        self.lookup(locale, key).is_some()
    }
}

const EN: &[(&str, &str)] = &[
    // Authentication / authorization
    ("error.auth.missing_header", "Missing authorization header"),
    ("error.auth.invalid_header", "Invalid authorization header format"),
    ("error.auth.invalid_token", "Invalid or expired token"),
    ("error.auth.invalid_credentials", "Invalid username or password"),
    ("error.auth.inactive", "This account is disabled"),
    ("error.auth.uuid_login_disabled", "Badge login is disabled"),
    ("error.auth.role_required", "The {role} role is required"),
    ("error.auth.edit_forbidden", "You don't have the rights to edit user: \"{user}\""),
    ("error.auth.owner_only", "Only user \"{user}\" can access this resource"),
    ("error.auth.incorrect_old_password", "Incorrect old password"),
    // Users
    ("error.user.not_found", "ERROR: User \"{user}\" doesn't exist"),
    ("error.user.already_registered", "User {username} is already registered."),
    ("error.user.init_done", "An admin user has already been created"),
    // Items
    ("error.item.not_found", "ERROR Item #{id} doesn't exist"),
    ("error.item.already_rented", "ERROR {title} is already rented by {renter}."),
    ("error.item.rental_changed", "{title} changed while your request was processed, please retry."),
    // Forms
    ("error.form.required", "{field} is required"),
    ("error.form.length", "{field} has an invalid length"),
    ("error.form.invalid", "{field} is invalid"),
    ("error.form.catalog_code_length", "{label} must be {length} characters long"),
    ("error.form.catalog_code_digits", "{label} must contain only numeric characters"),
    ("error.form.category_not_allowed", "Category {category} is not available for {kind}"),
    ("error.form.passwords_mismatch", "Passwords must match"),
    ("error.form.invalid_body", "Invalid request body: {details}"),
    // Generic
    ("error.database", "Database error"),
    ("error.internal", "Internal server error"),
    // Confirmations
    ("msg.item.created", "Item created successfully!"),
    ("msg.item.updated", "Item updated successfully!"),
    ("msg.item.rented", "You rented {title}."),
    ("msg.item.returned", "You gave back {title}."),
    ("msg.search.no_results", "No results found!"),
    ("msg.user.registered", "User {username} registered."),
    ("msg.user.updated", "User \"{username}\" updated successfully!"),
    ("msg.user.updated_by_admin", "User updated successfully!"),
    // Labels
    ("label.locale.fr", "French"),
    ("label.locale.en", "English"),
    ("label.locale.de", "German"),
    ("label.kind.book", "Book"),
    ("label.kind.game", "Game"),
    ("label.category.textbook", "Textbook"),
    ("label.category.grammar_and_vocabulary", "Grammar and Vocabulary"),
    ("label.category.literature", "Literature"),
    ("label.category.text_commentaries", "Text Commentaries and Teaching Material"),
    ("label.category.didactic_pedagogy", "Didactics and Pedagogy"),
    ("label.category.magazine", "Magazine"),
    ("label.category.game", "Game"),
    ("label.field.title", "Title"),
    ("label.field.publisher", "Publisher"),
    ("label.field.username", "Username"),
    ("label.field.password", "Password"),
    // Navigation
    ("nav.login", "Login"),
    ("nav.home", "Home"),
    ("nav.items", "Books"),
    ("nav.new_item", "New Book"),
    ("nav.list", "List"),
    ("nav.search", "Search"),
    ("nav.add_user", "Add user"),
    ("nav.user_list", "User list"),
    ("nav.barcode", "Show barcode"),
    ("nav.edit_password", "Edit password"),
    ("nav.logout", "Logout"),
];

const FR: &[(&str, &str)] = &[
    ("error.auth.missing_header", "En-tête d'autorisation manquant"),
    ("error.auth.invalid_header", "Format d'en-tête d'autorisation invalide"),
    ("error.auth.invalid_token", "Jeton invalide ou expiré"),
    ("error.auth.invalid_credentials", "Nom d'utilisateur ou mot de passe invalide"),
    ("error.auth.inactive", "Ce compte est désactivé"),
    ("error.auth.uuid_login_disabled", "La connexion par badge est désactivée"),
    ("error.auth.role_required", "Le rôle {role} est requis"),
    ("error.auth.edit_forbidden", "Vous n'avez pas les droits pour modifier l'utilisateur : \"{user}\""),
    ("error.auth.owner_only", "Seul l'utilisateur \"{user}\" peut accéder à cette ressource"),
    ("error.auth.incorrect_old_password", "Ancien mot de passe incorrect"),
    ("error.user.not_found", "ERREUR : l'utilisateur \"{user}\" n'existe pas"),
    ("error.user.already_registered", "L'utilisateur {username} est déjà enregistré."),
    ("error.user.init_done", "Un administrateur a déjà été créé"),
    ("error.item.not_found", "ERREUR l'article n°{id} n'existe pas"),
    ("error.item.already_rented", "ERREUR {title} est déjà emprunté par {renter}."),
    ("error.item.rental_changed", "{title} a changé pendant le traitement de votre demande, veuillez réessayer."),
    ("error.form.required", "{field} est obligatoire"),
    ("error.form.length", "{field} a une longueur invalide"),
    ("error.form.invalid", "{field} est invalide"),
    ("error.form.catalog_code_length", "{label} doit comporter {length} caractères"),
    ("error.form.catalog_code_digits", "{label} ne doit contenir que des chiffres"),
    ("error.form.category_not_allowed", "La catégorie {category} n'est pas disponible pour {kind}"),
    ("error.form.passwords_mismatch", "Les mots de passe doivent correspondre"),
    ("error.form.invalid_body", "Corps de requête invalide : {details}"),
    ("error.database", "Erreur de base de données"),
    ("error.internal", "Erreur interne du serveur"),
    ("msg.item.created", "Article créé avec succès !"),
    ("msg.item.updated", "Article mis à jour avec succès !"),
    ("msg.item.rented", "Vous avez emprunté {title}."),
    ("msg.item.returned", "Vous avez rendu {title}."),
    ("msg.search.no_results", "Aucun résultat !"),
    ("msg.user.registered", "Utilisateur {username} enregistré."),
    ("msg.user.updated", "Utilisateur \"{username}\" mis à jour avec succès !"),
    ("msg.user.updated_by_admin", "Utilisateur mis à jour avec succès !"),
    ("label.locale.fr", "Français"),
    ("label.locale.en", "Anglais"),
    ("label.locale.de", "Allemand"),
    ("label.kind.book", "Livre"),
    ("label.kind.game", "Jeu"),
    ("label.category.textbook", "Manuel"),
    ("label.category.grammar_and_vocabulary", "Grammaire et vocabulaire"),
    ("label.category.literature", "Littérature"),
    ("label.category.text_commentaries", "Commentaires de texte et matériel pédagogique"),
    ("label.category.didactic_pedagogy", "Didactique et pédagogie"),
    ("label.category.magazine", "Magazine"),
    ("label.category.game", "Jeu"),
    ("label.field.title", "Titre"),
    ("label.field.publisher", "Éditeur"),
    ("label.field.username", "Nom d'utilisateur"),
    ("label.field.password", "Mot de passe"),
    ("nav.login", "Connexion"),
    ("nav.home", "Accueil"),
    ("nav.items", "Livres"),
    ("nav.new_item", "Nouveau livre"),
    ("nav.list", "Liste"),
    ("nav.search", "Recherche"),
    ("nav.add_user", "Ajouter un utilisateur"),
    ("nav.user_list", "Liste des utilisateurs"),
    ("nav.barcode", "Afficher le code-barres"),
    ("nav.edit_password", "Modifier le mot de passe"),
    ("nav.logout", "Déconnexion"),
];

const DE: &[(&str, &str)] = &[
    ("error.auth.missing_header", "Authorization-Header fehlt"),
    ("error.auth.invalid_token", "Ungültiges oder abgelaufenes Token"),
    ("error.auth.invalid_credentials", "Ungültiger Benutzername oder Passwort"),
    ("error.auth.inactive", "Dieses Konto ist deaktiviert"),
    ("error.auth.role_required", "Die Rolle {role} ist erforderlich"),
    ("error.auth.incorrect_old_password", "Altes Passwort ist falsch"),
    ("error.user.not_found", "FEHLER: Benutzer \"{user}\" existiert nicht"),
    ("error.user.already_registered", "Benutzer {username} ist bereits registriert."),
    ("error.item.not_found", "FEHLER Artikel Nr. {id} existiert nicht"),
    ("error.item.already_rented", "FEHLER {title} ist bereits von {renter} ausgeliehen."),
    ("error.form.required", "{field} ist erforderlich"),
    ("error.form.catalog_code_length", "{label} muss {length} Zeichen lang sein"),
    ("error.form.catalog_code_digits", "{label} darf nur Ziffern enthalten"),
    ("error.form.passwords_mismatch", "Passwörter müssen übereinstimmen"),
    ("error.internal", "Interner Serverfehler"),
    ("msg.item.created", "Artikel erfolgreich angelegt!"),
    ("msg.item.updated", "Artikel erfolgreich aktualisiert!"),
    ("msg.item.rented", "Sie haben {title} ausgeliehen."),
    ("msg.item.returned", "Sie haben {title} zurückgegeben."),
    ("msg.search.no_results", "Keine Ergebnisse gefunden!"),
    ("msg.user.updated", "Benutzer \"{username}\" erfolgreich aktualisiert!"),
    ("label.locale.fr", "Französisch"),
    ("label.locale.en", "Englisch"),
    ("label.locale.de", "Deutsch"),
    ("label.kind.book", "Buch"),
    ("label.kind.game", "Spiel"),
    ("label.category.textbook", "Lehrbuch"),
    ("label.category.grammar_and_vocabulary", "Grammatik und Wortschatz"),
    ("label.category.literature", "Literatur"),
    ("label.category.magazine", "Zeitschrift"),
    ("label.category.game", "Spiel"),
    ("label.field.title", "Titel"),
    ("label.field.publisher", "Verlag"),
    ("nav.login", "Anmelden"),
    ("nav.home", "Startseite"),
    ("nav.items", "Bücher"),
    ("nav.new_item", "Neues Buch"),
    ("nav.list", "Liste"),
    ("nav.search", "Suche"),
    ("nav.add_user", "Benutzer hinzufügen"),
    ("nav.user_list", "Benutzerliste"),
    ("nav.barcode", "Barcode anzeigen"),
    ("nav.edit_password", "Passwort ändern"),
    ("nav.logout", "Abmelden"),
];
