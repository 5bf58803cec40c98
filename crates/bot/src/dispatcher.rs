//! Routes each update to the directory use cases and writes the replies.
//!
//! Routing order for plain text: conversation in progress, reference token,
//! fixed menu entries, menu nodes with children, category labels, then search.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use integrations::Assistant;
use service::callbacks::{parse_reference_token, Callback, ContactType, ServiceAction};
use service::conversation::{ConversationInput, ConversationOutcome, ConversationStore, Prompt, CANCEL_COMMAND};
use service::directory::{CallReveal, DirectoryRepository, DirectoryService, MapReveal};
use service::menu::{navigate, CONTACT_MENU_LABEL, MAP_MENU_LABEL};
use service::presenter::{escape_html, Rendered};

use crate::errors::BotError;
use crate::keyboards;
use crate::observability::{CALLBACKS_TOTAL, HANDLER_ERRORS_TOTAL, SEARCHES_TOTAL, UPDATES_TOTAL, UPDATE_DURATION};
use crate::telegram::types::{CallbackQuery, Message, ReplyMarkup, Update, User};
use crate::telegram::TelegramApi;

pub const START_COMMAND: &str = "/start";

const SEARCHING: &str = "🔎 Хвилинку, шукаю за вашим запитом...";
const RECOGNIZING: &str = "🎤 Розпізнаю ваше голосове повідомлення...";
const VOICE_FAILED: &str = "Вибачте, не вдалося розпізнати ваше повідомлення. Спробуйте ще раз.";
const QUERY_FAILED: &str = "Вибачте, не вдалося обробити ваш запит. Спробуйте перефразувати.";
const FALLBACK: &str = "😔 Сталася помилка. Спробуйте, будь ласка, пізніше.";
const CANCELLED: &str = "Скасовано.";
const FORWARDED: &str = "Дякуємо! Ваше повідомлення передано адміністратору.";
const CONTACT_UNAVAILABLE: &str = "Вибачте, зв'язок з адміністратором зараз недоступний.";
const NO_COORDINATES: &str = "Для цієї послуги немає координат.";
const NO_PHONE: &str = "Для цієї послуги не вказано телефон.";
const SERVICE_GONE: &str = "Послугу не знайдено.";
const STALE_BUTTON: &str = "Ця кнопка застаріла.";
const MAIN_MENU_TITLE: &str = "Головне меню";

#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    pub max_search_results: usize,
    pub admin_chat_id: Option<i64>,
}

pub struct Dispatcher<R: DirectoryRepository, T: TelegramApi> {
    directory: DirectoryService<R>,
    telegram: Arc<T>,
    assistant: Option<Arc<dyn Assistant>>,
    conversations: ConversationStore,
    cfg: DispatcherConfig,
}

fn is_command(text: &str, command: &str) -> bool {
    match text.strip_prefix(command) {
        Some(rest) => rest.is_empty() || rest.starts_with(' ') || rest.starts_with('@'),
        None => false,
    }
}

fn chat_of(update: &Update) -> Option<i64> {
    update
        .message
        .as_ref()
        .map(|m| m.chat.id)
        .or_else(|| update.callback_query.as_ref().map(|cq| cq.message.as_ref().map_or(cq.from.id, |m| m.chat.id)))
}

impl<R: DirectoryRepository, T: TelegramApi> Dispatcher<R, T> {
    pub fn new(
        directory: DirectoryService<R>,
        telegram: Arc<T>,
        assistant: Option<Arc<dyn Assistant>>,
        cfg: DispatcherConfig,
    ) -> Self {
        Self { directory, telegram, assistant, conversations: ConversationStore::new(), cfg }
    }

    pub fn telegram(&self) -> &Arc<T> { &self.telegram }

    pub fn conversations(&self) -> &ConversationStore { &self.conversations }

    /// Handle one update. Failures are logged, counted and answered with a fallback reply.
    pub async fn handle_update(&self, update: Update) {
        UPDATES_TOTAL.inc();
        let timer = UPDATE_DURATION.start_timer();
        let update_id = update.update_id;
        let chat_id = chat_of(&update);
        if let Err(e) = self.route(update).await {
            HANDLER_ERRORS_TOTAL.inc();
            error!(update_id, ?chat_id, error = %e, "update handling failed");
            if let Some(chat_id) = chat_id {
                if let Err(e) = self.telegram.send_message(chat_id, FALLBACK, None).await {
                    warn!(chat_id, error = %e, "fallback reply failed");
                }
            }
        }
        timer.observe_duration();
    }

    async fn route(&self, update: Update) -> Result<(), BotError> {
        if let Some(cq) = update.callback_query {
            return self.on_callback(cq).await;
        }
        if let Some(msg) = update.message {
            return self.on_message(msg).await;
        }
        debug!(update_id = update.update_id, "ignoring update without message or callback");
        Ok(())
    }

    async fn send_rendered(&self, chat_id: i64, r: Rendered) -> Result<(), BotError> {
        self.telegram.send_message(chat_id, &r.text, keyboards::inline_markup(&r.actions)).await
    }

    async fn send_plain(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        self.telegram.send_message(chat_id, text, None).await
    }

    async fn main_menu(&self) -> Result<ReplyMarkup, BotError> {
        let labels = self.directory.root_menu_labels().await?;
        Ok(keyboards::main_menu(&labels))
    }

    #[instrument(skip(self, msg), fields(chat_id = msg.chat.id))]
    async fn on_message(&self, msg: Message) -> Result<(), BotError> {
        let chat_id = msg.chat.id;
        let user_id = msg.from.as_ref().map_or(chat_id, |u| u.id);

        if let Some(voice) = &msg.voice {
            return self.on_voice(chat_id, &voice.file_id).await;
        }
        let Some(text) = msg.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(());
        };

        if is_command(text, START_COMMAND) {
            self.conversations.apply(user_id, ConversationInput::Cancel);
            return self.greet(chat_id, msg.from.as_ref()).await;
        }
        if is_command(text, CANCEL_COMMAND) {
            self.conversations.apply(user_id, ConversationInput::Cancel);
            let menu = self.main_menu().await?;
            return self.telegram.send_message(chat_id, CANCELLED, Some(menu)).await;
        }

        match self.conversations.apply(user_id, ConversationInput::Text(text.to_string())) {
            ConversationOutcome::NotHandled => self.on_text(chat_id, user_id, text).await,
            ConversationOutcome::Submitted { contact_type, text } => {
                self.forward_to_admin(chat_id, msg.from.as_ref(), contact_type, &text).await
            }
            ConversationOutcome::Prompt(p) => self.send_rendered(chat_id, p.render()).await,
            ConversationOutcome::Cancelled => self.send_plain(chat_id, CANCELLED).await,
        }
    }

    async fn greet(&self, chat_id: i64, user: Option<&User>) -> Result<(), BotError> {
        let name = user.map(User::full_name).unwrap_or_default();
        let text = format!(
            "Вітаю, {}!\n\nЯ ваш персональний помічник по місту Сновськ. Чим можу допомогти?",
            escape_html(&name)
        );
        let menu = self.main_menu().await?;
        self.telegram.send_message(chat_id, &text, Some(menu)).await
    }

    /// Text outside a conversation; also the target of leaf menu buttons.
    async fn on_text(&self, chat_id: i64, user_id: i64, text: &str) -> Result<(), BotError> {
        if let Some(id) = parse_reference_token(text) {
            let r = self.directory.service_detail(id).await?;
            return self.send_rendered(chat_id, r).await;
        }
        if text == CONTACT_MENU_LABEL {
            self.conversations.apply(user_id, ConversationInput::StartContact);
            return self.send_rendered(chat_id, Prompt::ChooseType.render()).await;
        }
        if text == MAP_MENU_LABEL {
            let r = self.directory.geolocated().await?;
            return self.send_rendered(chat_id, r).await;
        }

        let tree = self.directory.menu_tree().await?;
        if let Some(node) = tree.find_by_text(text).filter(|n| tree.has_children(n.id)) {
            if let Some(view) = navigate(&tree, Some(node.id)) {
                let markup = ReplyMarkup::Inline(keyboards::menu_view(&view));
                return self.telegram.send_message(chat_id, &escape_html(&node.text), Some(markup)).await;
            }
        }

        if let Some(category) = self.directory.resolve_category(text).await? {
            let r = self.directory.category_page(&category, 1).await?;
            return self.send_rendered(chat_id, r).await;
        }

        self.send_plain(chat_id, SEARCHING).await?;
        self.search(chat_id, text).await
    }

    /// Translate, reduce to keywords, query the store, send a detail view per hit.
    #[instrument(skip(self, text))]
    async fn search(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        SEARCHES_TOTAL.inc();
        let query = match &self.assistant {
            None => Some(text.to_string()),
            Some(ai) => {
                let translated = match ai.translate_to_ukrainian(text).await {
                    Ok(t) => t,
                    Err(e) => {
                        warn!(error = %e, "translation failed; searching with original text");
                        text.to_string()
                    }
                };
                match ai.extract_search_query(&translated).await {
                    Ok(q) => q,
                    Err(e) => {
                        warn!(error = %e, "keyword extraction failed");
                        None
                    }
                }
            }
        };
        let Some(query) = query.map(|q| q.trim().to_string()).filter(|q| !q.is_empty()) else {
            return self.send_plain(chat_id, QUERY_FAILED).await;
        };
        info!(%query, "searching directory");
        for r in self.directory.search(&query, self.cfg.max_search_results).await? {
            self.send_rendered(chat_id, r).await?;
        }
        Ok(())
    }

    async fn on_voice(&self, chat_id: i64, file_id: &str) -> Result<(), BotError> {
        self.send_plain(chat_id, RECOGNIZING).await?;
        let Some(ai) = &self.assistant else {
            warn!("voice note received but the AI assistant is disabled");
            return self.send_plain(chat_id, VOICE_FAILED).await;
        };
        let audio = self.telegram.download_file(file_id).await?;
        let transcript = match ai.transcribe(audio).await {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "transcription failed");
                None
            }
        };
        let Some(transcript) = transcript.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) else {
            return self.send_plain(chat_id, VOICE_FAILED).await;
        };
        self.send_plain(chat_id, &format!("Ви сказали: \"{}\". Шукаю...", escape_html(&transcript)))
            .await?;
        self.search(chat_id, &transcript).await
    }

    async fn forward_to_admin(
        &self,
        chat_id: i64,
        from: Option<&User>,
        contact_type: ContactType,
        text: &str,
    ) -> Result<(), BotError> {
        let Some(admin_chat_id) = self.cfg.admin_chat_id else {
            warn!(chat_id, "admin_chat_id is not configured; dropping contact message");
            return self.send_plain(chat_id, CONTACT_UNAVAILABLE).await;
        };
        let who = match from {
            Some(u) => format!("{} (id {})", escape_html(&u.full_name()), u.id),
            None => format!("chat {}", chat_id),
        };
        let mut body = match contact_type {
            ContactType::Message => format!("✉️ <b>Повідомлення від {}</b>\n\n{}", who, escape_html(text)),
            ContactType::SuggestService => format!("➕ <b>Пропозиція послуги від {}</b>\n\n{}", who, escape_html(text)),
        };
        if contact_type == ContactType::SuggestService {
            if let Some(preview) = self.draft_preview(text).await {
                body.push_str(&format!("\n\n<pre>{}</pre>", escape_html(&preview)));
            }
        }
        self.telegram.send_message(admin_chat_id, &body, None).await?;
        info!(chat_id, kind = contact_type.as_str(), "forwarded to administrator");

        let menu = self.main_menu().await?;
        self.telegram.send_message(chat_id, FORWARDED, Some(menu)).await
    }

    /// Structured draft of a suggested service, pretty-printed for the administrator.
    async fn draft_preview(&self, text: &str) -> Option<String> {
        let ai = self.assistant.as_ref()?;
        let categories = match self.directory.repository().list_categories().await {
            Ok(c) => c.into_iter().map(|c| c.name).collect::<Vec<_>>(),
            Err(e) => {
                warn!(error = %e, "cannot list categories for draft preview");
                return None;
            }
        };
        match ai.extract_service(text, &categories).await {
            Ok(draft) => draft.and_then(|d| serde_json::to_string_pretty(&d).ok()),
            Err(e) => {
                warn!(error = %e, "service extraction failed");
                None
            }
        }
    }

    #[instrument(skip(self, cq), fields(data = ?cq.data))]
    async fn on_callback(&self, cq: CallbackQuery) -> Result<(), BotError> {
        CALLBACKS_TOTAL.inc();
        let chat_id = cq.message.as_ref().map_or(cq.from.id, |m| m.chat.id);
        let Some(callback) = cq.data.as_deref().and_then(Callback::decode) else {
            return self.telegram.answer_callback_query(&cq.id, Some(STALE_BUTTON), false).await;
        };

        match callback {
            Callback::Pagination(p) => {
                let r = self.directory.category_page(&p.category_name, p.page).await?;
                match &cq.message {
                    Some(m) => {
                        self.telegram
                            .edit_message_text(chat_id, m.message_id, &r.text, keyboards::inline_keyboard(&r.actions))
                            .await?
                    }
                    None => self.send_rendered(chat_id, r).await?,
                }
                self.telegram.answer_callback_query(&cq.id, None, false).await
            }
            Callback::Service(s) => match s.action {
                ServiceAction::Map => match self.directory.map_location(s.service_id).await? {
                    MapReveal::Location { latitude, longitude, .. } => {
                        self.telegram.send_location(chat_id, latitude, longitude).await?;
                        self.telegram.answer_callback_query(&cq.id, None, false).await
                    }
                    MapReveal::NoCoordinates => self.telegram.answer_callback_query(&cq.id, Some(NO_COORDINATES), true).await,
                    MapReveal::NotFound => self.telegram.answer_callback_query(&cq.id, Some(SERVICE_GONE), true).await,
                },
                ServiceAction::Call => match self.directory.call_contact(s.service_id).await? {
                    CallReveal::Contact { name, phone } => {
                        self.telegram.send_contact(chat_id, &phone, &name).await?;
                        self.telegram.answer_callback_query(&cq.id, None, false).await
                    }
                    CallReveal::NoPhone => self.telegram.answer_callback_query(&cq.id, Some(NO_PHONE), true).await,
                    CallReveal::NotFound => self.telegram.answer_callback_query(&cq.id, Some(SERVICE_GONE), true).await,
                },
            },
            Callback::Contact(contact_type) => {
                let outcome = self.conversations.apply(cq.from.id, ConversationInput::ChooseType(contact_type));
                self.telegram.answer_callback_query(&cq.id, None, false).await?;
                match outcome {
                    ConversationOutcome::Prompt(p) => self.send_rendered(chat_id, p.render()).await,
                    _ => Ok(()),
                }
            }
            Callback::Menu(m) => {
                let tree = self.directory.menu_tree().await?;
                let Some(view) = navigate(&tree, m.node) else {
                    return self.telegram.answer_callback_query(&cq.id, Some(STALE_BUTTON), true).await;
                };
                let node = m.node.and_then(|id| tree.get(id));
                if let Some(leaf) = node.filter(|_| view.children.is_empty()) {
                    self.telegram.answer_callback_query(&cq.id, None, false).await?;
                    return self.on_text(chat_id, cq.from.id, leaf.text.trim()).await;
                }
                let title = node.map_or_else(|| MAIN_MENU_TITLE.to_string(), |n| escape_html(&n.text));
                let markup = keyboards::menu_view(&view);
                match &cq.message {
                    Some(msg) => self.telegram.edit_message_text(chat_id, msg.message_id, &title, Some(markup)).await?,
                    None => self.telegram.send_message(chat_id, &title, Some(ReplyMarkup::Inline(markup))).await?,
                }
                self.telegram.answer_callback_query(&cq.id, None, false).await
            }
        }
    }
}
