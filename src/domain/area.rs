// src/domain/area.rs

use crate::domain::lead::Lead;
use std::collections::HashMap;

/// A city bucket derived from the lead collection. Never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaData<'a> {
    pub id: String,
    /// City string of the first lead seen for this slug.
    pub name: String,
    pub leads: Vec<&'a Lead>,
}

/// Lowercase the city and collapse each whitespace run into one hyphen.
/// Cities that only differ in case or spacing share a slug and therefore an area.
pub fn area_slug(city: &str) -> String {
    let mut slug = String::with_capacity(city.len());
    let mut in_space = false;
    for ch in city.chars() {
        if ch.is_whitespace() {
            if !in_space {
                slug.push('-');
                in_space = true;
            }
        } else {
            in_space = false;
            slug.extend(ch.to_lowercase());
        }
    }
    slug
}

/// Group leads by city slug. Areas come out in first-seen order.
pub fn partition_areas(leads: &[Lead]) -> Vec<AreaData<'_>> {
    let mut areas: Vec<AreaData<'_>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for lead in leads {
        let slug = area_slug(&lead.city);
        match index.get(&slug) {
            Some(&i) => areas[i].leads.push(lead),
            None => {
                index.insert(slug.clone(), areas.len());
                areas.push(AreaData {
                    id: slug,
                    name: lead.city.clone(),
                    leads: vec![lead],
                });
            }
        }
    }

    areas
}

/// Leads of one area, in store order.
pub fn area_leads<'a>(leads: &'a [Lead], area_id: &str) -> Vec<&'a Lead> {
    leads
        .iter()
        .filter(|lead| area_slug(&lead.city) == area_id)
        .collect()
}
