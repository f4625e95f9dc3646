// src/common/i18n.rs

// Catálogo estático de mensagens: (chave, russo, inglês).
// Russo é o idioma padrão do sistema.

pub const DEFAULT_LANG: &str = "ru";

const SUPPORTED: &[&str] = &["ru", "en"];

static CATALOG: &[(&str, &str, &str)] = &[
    // Genéricos
    ("validation_failed", "Одно или несколько полей заполнены неверно.", "One or more fields are invalid."),
    ("internal_error", "Произошла непредвиденная ошибка.", "An unexpected error occurred."),
    ("invalid_reference", "Связанный объект не найден.", "Referenced object does not exist."),
    ("forbidden", "Недостаточно прав для выполнения действия.", "You are not allowed to perform this action."),
    // Autenticação
    ("authentication_required", "Требуется аутентификация", "Authentication required"),
    ("invalid_token", "Недействительный или отсутствующий токен.", "Invalid or missing authentication token."),
    ("invalid_credentials", "Неверный email или пароль.", "Invalid email or password."),
    ("email_taken", "Этот email уже используется.", "This email is already in use."),
    // Status de solicitação
    ("status_missing", "Не указан статус", "Status is required"),
    ("status_invalid", "Неверный статус. Допустимые: {allowed}", "Invalid status. Allowed: {allowed}"),
    // Validação de campos
    ("required", "Обязательное поле.", "This field is required."),
    ("invalid_email", "Некорректный email.", "Invalid email address."),
    ("password_too_short", "Пароль должен содержать минимум 6 символов.", "Password must be at least 6 characters long."),
    ("name_too_short", "Название услуги должно содержать минимум 3 символа", "Service name must be at least 3 characters long"),
    ("name_too_long", "Название слишком длинное.", "Name is too long."),
    ("duration_out_of_range", "Срок выполнения должен быть от 1 до 365 дней", "Duration must be between 1 and 365 days"),
    ("address_required", "Укажите адрес отделения.", "Office address is required."),
    ("field_too_long", "Значение слишком длинное.", "Value is too long."),
    ("category_name_taken", "Категория с таким названием уже существует.", "A category with this name already exists."),
    // Upload
    ("upload_missing_file", "Файл не передан.", "No file was provided."),
    ("upload_empty_file", "Файл пуст.", "The uploaded file is empty."),
    ("upload_malformed", "Некорректный multipart-запрос.", "Malformed multipart request."),
    ("upload_invalid_file_type", "Тип файла должен быть image, pdf или other.", "File type must be image, pdf or other."),
    // Não encontrados
    ("user_not_found", "Пользователь не найден.", "User not found."),
    ("category_not_found", "Категория не найдена.", "Category not found."),
    ("service_not_found", "Услуга не найдена.", "Service not found."),
    ("office_not_found", "Отделение не найдено.", "Office not found."),
    ("request_not_found", "Заявка не найдена.", "Request not found."),
    ("document_not_found", "Документ не найден.", "Document not found."),
    ("appointment_not_found", "Запись на приём не найдена.", "Appointment not found."),
];

pub fn is_supported(lang: &str) -> bool {
    SUPPORTED.contains(&lang)
}

/// Busca a mensagem no catálogo. Chaves desconhecidas voltam como estão.
pub fn translate(lang: &str, key: &str) -> String {
    CATALOG
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, ru, en)| if lang == "en" { *en } else { *ru })
        .unwrap_or(key)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_keys() {
        assert_eq!(translate("ru", "status_missing"), "Не указан статус");
        assert_eq!(translate("en", "status_missing"), "Status is required");
    }

    #[test]
    fn unknown_language_falls_back_to_russian() {
        assert_eq!(translate("pt", "authentication_required"), "Требуется аутентификация");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        assert_eq!(translate("en", "something_else"), "something_else");
    }
}
