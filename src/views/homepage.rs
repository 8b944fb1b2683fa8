use maud::{html, Markup};

use crate::{
    db::{AuthUser, QuestionHistoryModel},
    names,
};

/// Usage figures shown to teachers and admins.
pub struct Overview {
    pub questions_generated: i64,
    pub anonymous_answers: i64,
    pub recent_questions: Vec<QuestionHistoryModel>,
}

pub fn login(unauthorized: bool) -> Markup {
    html! {
        article {
            h1 { "Log In" }
            @if unauthorized {
                p.error { "This account is not allowed to use the generator. Please sign in with your school email." }
            }
            a role="button" href=(names::GOOGLE_LOGIN_URL) { "Sign in with Google" }
        }
    }
}

pub fn home(user: &AuthUser, overview: Option<&Overview>) -> Markup {
    html! {
        article {
            h1 { "Welcome, " (user.display_name()) }
            p { "Signed in as " (user.email) "." }
            ul {
                li { a href=(names::performance_url(&user.id)) { "My performance" } }
                li { a href=(names::LOGOUT_URL) { "Log out" } }
            }
        }
        @if let Some(overview) = overview {
            (overview_section(overview))
        }
    }
}

fn overview_section(overview: &Overview) -> Markup {
    html! {
        article {
            h2 { "Overview" }
            p {
                (overview.questions_generated) " questions generated, "
                (overview.anonymous_answers) " answers from visitors without an account."
            }
            @if !overview.recent_questions.is_empty() {
                table {
                    thead {
                        tr { th { "Generated" } th { "Topic" } th { "Difficulty" } th { "Question" } th { "Answer" } }
                    }
                    tbody {
                        @for q in &overview.recent_questions {
                            tr {
                                td { (q.generated_at.format("%Y-%m-%d %H:%M")) }
                                td { (q.topic) }
                                td { (q.difficulty) }
                                td { (q.question_text) }
                                td { (q.correct_answer) }
                            }
                        }
                    }
                }
            }
        }
    }
}
