//! Built-in genre table.
//!
//! Alternates cover the spellings the common scrapers return (TMDB, IMDb,
//! OFDb, Kinopoisk-style localized names). No alternate may collide with a
//! name of another genre.

use super::BuiltIn;

pub(crate) const GENRES: &[BuiltIn] = &[
    BuiltIn {
        canonical: "ACTION",
        display: "Action",
        alternates: &["Action & Adventure", "de-Action", "fr-Action", "es-Acción", "it-Azione", "nl-Actie"],
    },
    BuiltIn {
        canonical: "ADVENTURE",
        display: "Adventure",
        alternates: &["de-Abenteuer", "fr-Aventure", "es-Aventura", "it-Avventura", "nl-Avontuur"],
    },
    BuiltIn {
        canonical: "ANIMATION",
        display: "Animation",
        alternates: &["Animated", "de-Zeichentrick", "fr-Animation", "es-Animación", "it-Animazione"],
    },
    BuiltIn {
        canonical: "ANIMAL",
        display: "Animal",
        alternates: &["de-Tierfilm", "fr-Animalier", "es-Animales", "it-Animali"],
    },
    BuiltIn {
        canonical: "BIOGRAPHY",
        display: "Biography",
        alternates: &["Biopic", "de-Biographie", "fr-Biographie", "es-Biografía", "it-Biografia"],
    },
    BuiltIn {
        canonical: "COMEDY",
        display: "Comedy",
        alternates: &["de-Komödie", "fr-Comédie", "es-Comedia", "it-Commedia", "nl-Komedie"],
    },
    BuiltIn {
        canonical: "CRIME",
        display: "Crime",
        alternates: &["de-Krimi", "fr-Policier", "es-Crimen", "it-Poliziesco", "nl-Misdaad"],
    },
    BuiltIn {
        canonical: "DISASTER",
        display: "Disaster",
        alternates: &["de-Katastrophenfilm", "fr-Catastrophe", "es-Desastre", "it-Catastrofico"],
    },
    BuiltIn {
        canonical: "DOCUMENTARY",
        display: "Documentary",
        alternates: &[
            "de-Dokumentarfilm",
            "de-Dokumentation",
            "fr-Documentaire",
            "es-Documental",
            "it-Documentario",
            "nl-Documentaire",
        ],
    },
    BuiltIn {
        canonical: "DRAMA",
        display: "Drama",
        alternates: &["de-Drama", "fr-Drame", "es-Drama", "it-Dramma"],
    },
    BuiltIn {
        canonical: "EASTERN",
        display: "Eastern",
        alternates: &["Martial Arts", "de-Eastern", "es-Artes marciales"],
    },
    BuiltIn {
        canonical: "EROTIC",
        display: "Erotic",
        alternates: &["de-Erotik", "fr-Érotique", "es-Erótico", "it-Erotico"],
    },
    BuiltIn {
        canonical: "FAMILY",
        display: "Family",
        alternates: &["Kids", "de-Familie", "fr-Familial", "es-Familia", "it-Famiglia", "nl-Familie"],
    },
    BuiltIn {
        canonical: "FAN_FILM",
        display: "Fan Film",
        alternates: &["Fanfilm", "de-Fan-Film"],
    },
    BuiltIn {
        canonical: "FANTASY",
        display: "Fantasy",
        alternates: &["de-Fantasy", "fr-Fantastique", "es-Fantasía", "it-Fantasy"],
    },
    BuiltIn {
        canonical: "FILM_NOIR",
        display: "Film Noir",
        alternates: &["Film-Noir", "fr-Film noir"],
    },
    BuiltIn {
        canonical: "FOREIGN",
        display: "Foreign",
        alternates: &["de-Ausländisch", "fr-Étranger", "es-Extranjero", "it-Straniero"],
    },
    BuiltIn {
        canonical: "GAME_SHOW",
        display: "Game Show",
        alternates: &["Game-Show", "de-Spielshow"],
    },
    BuiltIn {
        canonical: "HISTORY",
        display: "History",
        alternates: &["Historical", "de-Historie", "de-Geschichte", "fr-Histoire", "es-Historia", "it-Storia"],
    },
    BuiltIn {
        canonical: "HOLIDAY",
        display: "Holiday",
        alternates: &["Christmas", "de-Feiertag", "fr-Fêtes"],
    },
    BuiltIn {
        canonical: "HORROR",
        display: "Horror",
        alternates: &["de-Horror", "fr-Épouvante", "es-Terror", "it-Orrore"],
    },
    BuiltIn {
        canonical: "INDIE",
        display: "Indie",
        alternates: &["Independent", "Independent Film"],
    },
    BuiltIn {
        canonical: "MUSIC",
        display: "Music",
        alternates: &["de-Musik", "fr-Musique", "es-Música", "it-Musica"],
    },
    BuiltIn {
        canonical: "MUSICAL",
        display: "Musical",
        alternates: &["de-Musical", "fr-Comédie musicale", "es-Musical", "it-Musical"],
    },
    BuiltIn {
        canonical: "MYSTERY",
        display: "Mystery",
        alternates: &["de-Mystery", "fr-Mystère", "es-Misterio", "it-Mistero"],
    },
    BuiltIn {
        canonical: "NEO_NOIR",
        display: "Neo Noir",
        alternates: &["Neo-noir"],
    },
    BuiltIn {
        canonical: "NEWS",
        display: "News",
        alternates: &["de-Nachrichten", "fr-Actualités", "es-Noticias", "it-Notizie"],
    },
    BuiltIn {
        canonical: "REALITY_TV",
        display: "Reality TV",
        alternates: &["Reality", "Reality-TV", "fr-Téléréalité"],
    },
    BuiltIn {
        canonical: "ROAD_MOVIE",
        display: "Road Movie",
        alternates: &["de-Roadmovie", "fr-Road movie"],
    },
    BuiltIn {
        canonical: "ROMANCE",
        display: "Romance",
        alternates: &["de-Liebesfilm", "de-Romanze", "fr-Romance", "es-Romance", "it-Romantico", "nl-Romantiek"],
    },
    BuiltIn {
        canonical: "SCIENCE_FICTION",
        display: "Science Fiction",
        alternates: &[
            "Sci-Fi",
            "SciFi",
            "Sci-Fi & Fantasy",
            "de-Science Fiction",
            "fr-Science-Fiction",
            "es-Ciencia ficción",
            "it-Fantascienza",
        ],
    },
    BuiltIn {
        canonical: "SERIES",
        display: "Series",
        alternates: &["de-Serie", "fr-Série", "it-Serie TV"],
    },
    BuiltIn {
        canonical: "SHORT",
        display: "Short",
        alternates: &["Short Film", "de-Kurzfilm", "fr-Court métrage", "es-Cortometraje", "it-Cortometraggio"],
    },
    BuiltIn {
        canonical: "SILENT_MOVIE",
        display: "Silent Movie",
        alternates: &["Silent", "de-Stummfilm", "fr-Film muet", "es-Cine mudo", "it-Film muto"],
    },
    BuiltIn {
        canonical: "SPORT",
        display: "Sport",
        alternates: &["Sports", "de-Sport", "fr-Sport", "es-Deporte"],
    },
    BuiltIn {
        canonical: "SPORTING_EVENT",
        display: "Sporting Event",
        alternates: &["de-Sportereignis", "fr-Événement sportif"],
    },
    BuiltIn {
        canonical: "SPORTS_FILM",
        display: "Sports Film",
        alternates: &["de-Sportfilm", "fr-Film de sport"],
    },
    BuiltIn {
        canonical: "SUSPENSE",
        display: "Suspense",
        alternates: &["de-Spannung", "fr-Suspense", "es-Suspenso", "it-Suspense"],
    },
    BuiltIn {
        canonical: "TALK_SHOW",
        display: "Talk Show",
        alternates: &["Talk", "de-Talkshow"],
    },
    BuiltIn {
        canonical: "TV_MOVIE",
        display: "TV Movie",
        alternates: &["de-TV-Film", "fr-Téléfilm", "es-Película de TV", "it-Film TV"],
    },
    BuiltIn {
        canonical: "THRILLER",
        display: "Thriller",
        alternates: &["de-Thriller", "fr-Thriller", "es-Intriga", "it-Thriller"],
    },
    BuiltIn {
        canonical: "WAR",
        display: "War",
        alternates: &["War & Politics", "de-Kriegsfilm", "de-Krieg", "fr-Guerre", "es-Bélica", "it-Guerra"],
    },
    BuiltIn {
        canonical: "WESTERN",
        display: "Western",
        alternates: &["de-Western", "fr-Western", "es-Western", "it-Western"],
    },
];
