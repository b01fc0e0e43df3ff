use crate::config::Config;
use crate::models::menu::{ClaimResult, WeekMenu};
use crate::models::week::WeekResolution;

/// Page text that comes from configuration rather than the sheet.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub group_name: String,
    pub coordinator_name: String,
    pub header_image: String,
    pub thanks_image: String,
    pub password_required: bool,
}

impl PageContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            group_name: config.group_name.clone(),
            coordinator_name: config.coordinator_name.clone(),
            header_image: config.header_image.clone(),
            thanks_image: config.thanks_image.clone(),
            password_required: config.app_password.is_some(),
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn sunday_label(resolution: &WeekResolution) -> String {
    resolution.target_sunday.format("%B %d %Y").to_string()
}

fn layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width,initial-scale=1">
  <title>{title}</title>
</head>
<body style="margin:0;padding:0;background-color:#f8fafc;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Helvetica,Arial,sans-serif;color:#1e293b">
  <main style="max-width:720px;margin:0 auto;padding:32px 16px">
    {content}
  </main>
</body>
</html>"#,
        title = escape(title),
    )
}

fn notice(kind: &str, message: &str) -> String {
    let (bg, fg) = match kind {
        "success" => ("#dcfce7", "#166534"),
        "warning" => ("#fef9c3", "#854d0e"),
        _ => ("#fee2e2", "#991b1b"),
    };
    format!(
        r#"<div style="background:{bg};color:{fg};border-radius:8px;padding:12px 16px;margin:12px 0">{}</div>"#,
        escape(message)
    )
}

fn back_link() -> &'static str {
    r#"<p style="margin-top:24px"><a href="/" style="color:#2563eb">Back to the sign-up sheet</a></p>"#
}

/// The weekly sign-up page.
pub fn render_signup(ctx: &PageContext, resolution: &WeekResolution, menu: &WeekMenu) -> String {
    let mut html = format!(
        r#"<h1 style="font-size:26px">This Week's {group} Meal Theme: {theme}</h1>
    <p>Here is how we do meal sign-ups! The list updates every Monday with the food items for the upcoming Sunday, so please use this same link every week. Please sign up for an item to bring for this Sunday, {sunday}, and share the link with whoever is interested. If you have any questions, please reach out to {coordinator}. Thank you!</p>"#,
        group = escape(&ctx.group_name),
        theme = escape(&menu.theme),
        sunday = escape(&sunday_label(resolution)),
        coordinator = escape(&ctx.coordinator_name),
    );

    if !menu.next_week_theme.trim().is_empty() {
        html.push_str(&format!(
            "<p>For those who meal plan, next week's theme is: <strong>{}</strong></p>",
            escape(&menu.next_week_theme)
        ));
    }

    html.push_str(&format!(
        r#"<img src="/assets/{}" alt="" style="max-width:100%;border-radius:8px;margin:16px 0">"#,
        escape(&ctx.header_image)
    ));

    html.push_str(&format!(
        r#"<h2 style="font-size:20px">Food/Drink Items Still Needed</h2>
    <table style="border-collapse:collapse;width:100%;background:#fff">
      <thead><tr><th style="text-align:left;padding:8px;border-bottom:2px solid #e2e8f0">{}</th></tr></thead>
      <tbody>"#,
        escape(&menu.item_header)
    ));

    let needed: Vec<_> = menu.claimable().collect();
    for item in &needed {
        html.push_str(&format!(
            r#"<tr><td style="padding:8px;border-bottom:1px solid #f1f5f9">{}</td></tr>"#,
            escape(&item.name)
        ));
    }
    html.push_str("</tbody></table>");

    if needed.is_empty() {
        html.push_str(&notice("success", "Every item has been signed up for. Thank you!"));
        return layout(&ctx.group_name, &html);
    }

    html.push_str(&format!(
        r#"<h2 style="font-size:20px;margin-top:32px">Sign Up for an Item</h2>
    <form method="post" action="/claims">
      <input type="hidden" name="week" value="{week}">
      <label for="items">Select an item to bring</label><br>
      <select id="items" name="items" multiple size="8" style="width:100%;margin:8px 0 16px">"#,
        week = resolution.week_key,
    ));
    for item in &needed {
        let name = escape(&item.name);
        html.push_str(&format!(r#"<option value="{name}">{name}</option>"#));
    }
    html.push_str(
        r#"</select><br>
      <label for="name">Your Name</label><br>
      <input id="name" name="name" type="text" required style="width:100%;margin:8px 0 16px"><br>"#,
    );
    if ctx.password_required {
        html.push_str(
            r#"<label for="password">Group password</label><br>
      <input id="password" name="password" type="password" style="width:100%;margin:8px 0 16px"><br>"#,
        );
    }
    html.push_str(r#"<button type="submit" style="padding:8px 20px">Submit</button></form>"#);

    layout(&ctx.group_name, &html)
}

/// No worksheet exists for the resolved week.
pub fn render_week_missing(ctx: &PageContext, resolution: &WeekResolution) -> String {
    let content = format!(
        r#"<h1 style="font-size:26px">{group} Meal Sign-Up</h1>{notice}<p>Please message {coordinator} and let them know.</p>"#,
        group = escape(&ctx.group_name),
        notice = notice(
            "error",
            &format!("Sheet for week {} not found.", resolution.week_key)
        ),
        coordinator = escape(&ctx.coordinator_name),
    );
    layout(&ctx.group_name, &content)
}

/// The worksheet exists but has no items on it yet.
pub fn render_sheet_empty(ctx: &PageContext, resolution: &WeekResolution) -> String {
    let content = format!(
        r#"<h1 style="font-size:26px">{group} Meal Sign-Up</h1>{notice}"#,
        group = escape(&ctx.group_name),
        notice = notice(
            "warning",
            &format!(
                "The sheet for Sunday {} is empty - sorry! Please message {} and let them know :)",
                sunday_label(resolution),
                ctx.coordinator_name
            )
        ),
    );
    layout(&ctx.group_name, &content)
}

pub fn render_claim_result(ctx: &PageContext, claimant: &str, result: &ClaimResult) -> String {
    let mut html = format!(
        r#"<h1 style="font-size:26px">{} Meal Sign-Up</h1>"#,
        escape(&ctx.group_name)
    );

    for item in &result.rejected {
        html.push_str(&notice(
            "error",
            &format!("Someone is already bringing {item}! Please sign up for a different item :)"),
        ));
    }
    for item in &result.missing {
        html.push_str(&notice(
            "warning",
            &format!("{item} is no longer on this week's list."),
        ));
    }

    if !result.accepted.is_empty() {
        html.push_str(&notice(
            "success",
            &format!(
                "Thank you {} for signing up to bring {}!",
                claimant.trim(),
                result.accepted.join(", ")
            ),
        ));
        html.push_str(&format!(
            r#"<img src="/assets/{}" alt="" style="max-width:100%;border-radius:8px;margin:16px 0">"#,
            escape(&ctx.thanks_image)
        ));
    }

    html.push_str(back_link());
    layout(&ctx.group_name, &html)
}

/// Validation problems and store outages.
pub fn render_error(ctx: &PageContext, message: &str) -> String {
    let content = format!(
        r#"<h1 style="font-size:26px">{} Meal Sign-Up</h1>{}{}"#,
        escape(&ctx.group_name),
        notice("error", message),
        back_link()
    );
    layout(&ctx.group_name, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::menu::MenuItem;
    use chrono::NaiveDate;

    fn ctx() -> PageContext {
        PageContext {
            group_name: "Sabal Chase".into(),
            coordinator_name: "Kenzie".into(),
            header_image: "header.jpg".into(),
            thanks_image: "thanks.jpg".into(),
            password_required: false,
        }
    }

    fn resolution() -> WeekResolution {
        WeekResolution {
            week_key: 5,
            target_sunday: NaiveDate::from_ymd_opt(2025, 2, 2).unwrap(),
        }
    }

    fn menu(items: Vec<MenuItem>) -> WeekMenu {
        WeekMenu {
            week_key: 5,
            theme: "Mac & Cheese".into(),
            next_week_theme: "Tacos".into(),
            item_header: "Food/Drink Item".into(),
            items,
        }
    }

    fn item(name: &str, claimant: &str, row: u32) -> MenuItem {
        MenuItem {
            name: name.into(),
            claimant: claimant.into(),
            row,
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<b>"Tom's"</b> & co"#), "&lt;b&gt;&quot;Tom&#39;s&quot;&lt;/b&gt; &amp; co");
    }

    #[test]
    fn signup_lists_only_unclaimed_items() {
        let html = render_signup(
            &ctx(),
            &resolution(),
            &menu(vec![item("Salad", "", 3), item("Bread", "Alice", 4)]),
        );
        assert!(html.contains("Mac &amp; Cheese"));
        assert!(html.contains("February 02 2025"));
        assert!(html.contains("next week's theme is: <strong>Tacos</strong>"));
        assert!(html.contains(r#"<option value="Salad">Salad</option>"#));
        assert!(!html.contains("Bread"));
        assert!(!html.contains(r#"name="password""#));
        assert!(html.contains(r#"<input type="hidden" name="week" value="5">"#));
    }

    #[test]
    fn signup_asks_for_password_when_configured() {
        let mut ctx = ctx();
        ctx.password_required = true;
        let html = render_signup(&ctx, &resolution(), &menu(vec![item("Salad", "", 3)]));
        assert!(html.contains(r#"name="password""#));
    }

    #[test]
    fn fully_claimed_week_has_no_form() {
        let html = render_signup(&ctx(), &resolution(), &menu(vec![item("Salad", "Alice", 3)]));
        assert!(!html.contains("<form"));
        assert!(html.contains("Every item has been signed up for"));
    }

    #[test]
    fn claim_result_reports_each_partition() {
        let result = ClaimResult {
            accepted: vec!["Bread".into()],
            rejected: vec!["Salad".into()],
            missing: vec!["Pie".into()],
        };
        let html = render_claim_result(&ctx(), " Carol ", &result);
        assert!(html.contains("Someone is already bringing Salad!"));
        assert!(html.contains("Pie is no longer on this week&#39;s list."));
        assert!(html.contains("Thank you Carol for signing up to bring Bread!"));
        assert!(html.contains("/assets/thanks.jpg"));
    }

    #[test]
    fn missing_week_names_the_week() {
        let html = render_week_missing(&ctx(), &resolution());
        assert!(html.contains("Sheet for week 5 not found."));
        assert!(html.contains("Kenzie"));
    }
}
