//! Venue coordinates and per-venue grouping for map views.

use crate::models::Event;

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coords {
    pub lat: f64,
    pub lon: f64,
}

impl Coords {
    const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Default map center: Lublin old town.
pub const CITY_CENTER: Coords = Coords::new(51.2465, 22.5684);

/// Known venues, matched by substring against lowercased locations. Order
/// matters: the first fragment found wins.
const VENUES: &[(&str, Coords)] = &[
    ("centrum spotkania kultur", Coords::new(51.2465, 22.5588)),
    ("csk", Coords::new(51.2465, 22.5588)),
    ("muzeum narodowe", Coords::new(51.2488, 22.5458)),
    ("galeria labirynt", Coords::new(51.2503, 22.5545)),
    ("kino bajka", Coords::new(51.2478, 22.5602)),
    ("multikino", Coords::new(51.2372, 22.5498)),
    ("cinema city", Coords::new(51.2195, 22.5180)),
    ("cinema city felicity", Coords::new(51.2195, 22.5180)),
    ("cinema city plaza", Coords::new(51.2450, 22.5730)),
    ("teatr stary", Coords::new(51.2485, 22.5618)),
    ("teatr im. juliusza osterwy", Coords::new(51.2490, 22.5550)),
    ("teatr osterwy", Coords::new(51.2490, 22.5550)),
    ("ck lublin", Coords::new(51.2468, 22.5570)),
    ("filharmonia lubelska", Coords::new(51.2478, 22.5510)),
    ("brama grodzka", Coords::new(51.2498, 22.5665)),
    ("zamek lubelski", Coords::new(51.2503, 22.5698)),
    ("trybunał koronny", Coords::new(51.2488, 22.5658)),
    ("chatka żaka", Coords::new(51.2465, 22.5445)),
    ("dom kultury lsm", Coords::new(51.2560, 22.5430)),
    ("centrum kultury", Coords::new(51.2468, 22.5570)),
    ("ośrodek brama grodzka", Coords::new(51.2498, 22.5665)),
];

pub fn find_coords(location: &str) -> Option<Coords> {
    let location = location.to_lowercase();
    VENUES
        .iter()
        .find(|(fragment, _)| location.contains(fragment))
        .map(|(_, coords)| *coords)
}

/// Events sharing one map position.
#[derive(Debug, Clone)]
pub struct VenueGroup<'a> {
    pub coords: Coords,
    /// Location of the first event seen at these coordinates.
    pub name: String,
    pub events: Vec<&'a Event>,
}

/// Group events by resolved venue coordinates, in first-seen order. Events
/// at unknown venues are left out.
pub fn group_by_venue<'a, I>(events: I) -> Vec<VenueGroup<'a>>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut groups: Vec<VenueGroup<'a>> = Vec::new();
    for event in events {
        let Some(coords) = find_coords(&event.location) else {
            continue;
        };
        match groups.iter_mut().find(|g| g.coords == coords) {
            Some(group) => group.events.push(event),
            None => groups.push(VenueGroup {
                coords,
                name: event.location.clone(),
                events: vec![event],
            }),
        }
    }
    groups
}
