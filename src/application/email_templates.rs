use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::application::locale::Locale;

/// Values rendered into the credit email.
pub struct CreditEmailContent<'a> {
    pub event_name: &'a str,
    pub name: &'a str,
    pub credit_link: &'a str,
    pub credit_code: &'a str,
    pub company: Option<&'a str>,
    pub is_test: bool,
    pub locale: Locale,
}

struct Texts {
    subject: &'static str,
    greeting: &'static str,
    thanks: &'static str,
    intro: &'static str,
    your_credit: &'static str,
    code: &'static str,
    use_credit: &'static str,
    test_warning: &'static str,
    how_to_use: &'static str,
    steps: [&'static str; 3],
    questions: &'static str,
    company_label: &'static str,
}

fn texts(locale: Locale) -> Texts {
    match locale {
        Locale::PtBr => Texts {
            subject: "Seu crédito está aqui!",
            greeting: "Olá",
            thanks: "Obrigado por participar do",
            intro: "Estamos muito felizes em ter você na nossa comunidade. Aqui está seu crédito exclusivo:",
            your_credit: "Seu crédito",
            code: "Código",
            use_credit: "Usar meu crédito",
            test_warning: "Este é um crédito de TESTE (não válido para uso real)",
            how_to_use: "Como usar:",
            steps: [
                "Clique no botão acima ou copie o link",
                "Faça login ou crie sua conta",
                "O crédito será aplicado automaticamente!",
            ],
            questions: "Dúvidas? Entre em contato com os organizadores do evento.",
            company_label: "Empresa",
        },
        Locale::En => Texts {
            subject: "Your credit is here!",
            greeting: "Hello",
            thanks: "Thank you for joining",
            intro: "We're thrilled to have you in our community. Here's your exclusive credit:",
            your_credit: "Your credit",
            code: "Code",
            use_credit: "Use my credit",
            test_warning: "This is a TEST credit (not valid for real use)",
            how_to_use: "How to use:",
            steps: [
                "Click the button above or copy the link",
                "Sign in or create your account",
                "The credit will be applied automatically!",
            ],
            questions: "Questions? Contact the event organizers.",
            company_label: "Company",
        },
    }
}

pub fn primary_button(url: &str, label: &str) -> String {
    format!(
        r#"<a href="{url}" target="_blank" style="display:inline-block;padding:14px 32px;background-color:#ffffff;color:#0a0a0a;text-decoration:none;border-radius:12px;font-weight:600;">{label} &rarr;</a>"#,
        url = encode_double_quoted_attribute(url),
        label = encode_text(label),
    )
}

/// Returns `(subject, html)` for the email that delivers a claimed credit.
pub fn credit_email(content: &CreditEmailContent<'_>) -> (String, String) {
    let t = texts(content.locale);
    let event = encode_text(content.event_name);
    let subject = format!("{} - {}", t.subject, content.event_name);

    let company_block = content
        .company
        .filter(|c| !c.trim().is_empty())
        .map(|company| {
            format!(
                r#"<div style="background-color:#0a0a0a;border-radius:12px;padding:16px;margin-bottom:24px;">
  <p style="margin:0 0 4px;font-size:12px;color:#737373;text-transform:uppercase;">{label}</p>
  <p style="margin:0;font-size:14px;color:#ffffff;">{company}</p>
</div>"#,
                label = t.company_label,
                company = encode_text(company),
            )
        })
        .unwrap_or_default();

    let test_block = if content.is_test {
        format!(
            r#"<div style="background-color:#78350f;border:1px solid #92400e;border-radius:12px;padding:12px 16px;margin-bottom:24px;">
  <p style="margin:0;font-size:12px;color:#fbbf24;text-align:center;">&#9888; {}</p>
</div>"#,
            t.test_warning
        )
    } else {
        String::new()
    };

    let steps: String = t
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            format!(
                r#"<p style="margin:0 0 8px;font-size:13px;color:#a3a3a3;">{}. {}</p>"#,
                i + 1,
                step
            )
        })
        .collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head><meta charset="UTF-8"><title>{event} - {your_credit}</title></head>
<body style="margin:0;padding:40px 20px;background-color:#0a0a0a;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Arial,sans-serif;">
<div style="max-width:500px;margin:0 auto;">
  <h1 style="margin:0 0 32px;font-size:28px;color:#ffffff;text-align:center;">{event}</h1>
  <div style="background-color:#171717;border:1px solid #262626;border-radius:16px;padding:32px;">
    <h2 style="margin:0 0 8px;font-size:20px;color:#ffffff;">{greeting}, {name}!</h2>
    <p style="margin:0 0 24px;font-size:14px;color:#10b981;">{thanks} {event}!</p>
    <p style="margin:0 0 24px;font-size:14px;line-height:1.6;color:#a3a3a3;">{intro}</p>
    {company_block}
    {test_block}
    <div style="background-color:#0a0a0a;border:1px solid #262626;border-radius:12px;padding:20px;margin-bottom:24px;">
      <p style="margin:0 0 8px;font-size:10px;color:#737373;text-transform:uppercase;">{your_credit}</p>
      <p style="margin:0 0 4px;font-size:12px;color:#a3a3a3;">{code_label}: <span style="font-family:monospace;color:#ffffff;">{code}</span></p>
      <p style="margin:0;font-size:11px;color:#737373;word-break:break-all;font-family:monospace;">{link_text}</p>
    </div>
    <div style="text-align:center;">{button}</div>
  </div>
  <div style="background-color:#171717;border:1px solid #262626;border-radius:12px;padding:24px;margin-top:32px;">
    <p style="margin:0 0 16px;font-size:14px;font-weight:600;color:#ffffff;">{how_to_use}</p>
    {steps}
  </div>
  <p style="margin:32px 0 0;font-size:12px;color:#737373;text-align:center;">{questions}</p>
</div>
</body>
</html>"#,
        lang = content.locale.as_str(),
        event = event,
        your_credit = t.your_credit,
        greeting = t.greeting,
        name = encode_text(content.name),
        thanks = t.thanks,
        intro = t.intro,
        company_block = company_block,
        test_block = test_block,
        code_label = t.code,
        code = encode_text(content.credit_code),
        link_text = encode_text(content.credit_link),
        button = primary_button(content.credit_link, t.use_credit),
        how_to_use = t.how_to_use,
        steps = steps,
        questions = t.questions,
    );

    (subject, html)
}
