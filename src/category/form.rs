//! The form shared by the create and edit category pages.

use maud::{Markup, html};

use crate::{
    category::{TransactionType, domain::CategoryFormData},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        amount_input, base, dollar_input_styles, form_error, labelled_input,
    },
    navigation::NavBar,
};

/// Render the category form posting to `action`, pre-filled with `form_data`.
pub(super) fn category_form(
    action: &str,
    form_data: &CategoryFormData,
    error_message: Option<&str>,
    submit_label: &str,
) -> Markup {
    let no_type_selected = form_data.transaction_type.trim().is_empty();

    html! {
        form
            method="post"
            action=(action)
            class="w-full space-y-4 md:space-y-6"
        {
            (labelled_input("Category", "category", "text", &form_data.name, None))

            (amount_input("Planned Amount", "budget", &form_data.planned_amount))

            div
            {
                label for="type" class=(FORM_LABEL_STYLE) { "Type" }

                select
                    name="type"
                    id="type"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" disabled selected[no_type_selected] { "Choose a type" }

                    @for transaction_type in TransactionType::ALL {
                        option
                            value=(transaction_type.as_str())
                            selected[form_data.transaction_type.trim().eq_ignore_ascii_case(transaction_type.as_str())]
                        {
                            (transaction_type)
                        }
                    }
                }
            }

            (form_error(error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
        }
    }
}

/// Wrap a category form in a full page.
pub(super) fn category_form_page(title: &str, active_endpoint: &str, form: &Markup) -> Markup {
    let nav_bar = NavBar::new(active_endpoint).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { (title) }
                (form)
            }
        }
    };

    base(title, &[dollar_input_styles()], &content)
}
