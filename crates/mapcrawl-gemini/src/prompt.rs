use mapcrawl_core::QueryTuple;

/// Build the request prompt for one tuple.
///
/// Asks for name, phones, and full address per business; phone numbers are
/// later pulled out of the text with [`crate::parse::extract_phones`].
#[must_use]
pub fn build_prompt(tuple: &QueryTuple) -> String {
    format!(
        "List the \"{category}\" businesses in the {zone} area of {city}.\n\
         For every business provide all of the following:\n\
         1. Full business name\n\
         2. Landline and mobile phone numbers if available (separate them with commas)\n\
         3. Full street address\n\
         \n\
         IMPORTANT: return only real, verified businesses.",
        category = tuple.category,
        zone = tuple.zone,
        city = tuple.city,
    )
}
