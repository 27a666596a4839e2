//! Built-in station catalog.
//!
//! Ordered by popularity: the Taganrog-Rostov suburban line first, then
//! major cities by region.

/// (code, display name)
pub(super) const CATALOG: &[(&str, &str)] = &[
    // Most used
    ("s9634302", "Krasny Kotelshchik"),
    ("s9613483", "Taganrog (Old Station)"),
    ("s9613171", "Taganrog (New Station)"),
    ("s9612913", "Rostov-Glavny"),
    ("s9612914", "Rostov-Tovarny"),
    // Taganrog - Rostov line
    ("s9613486", "Merzhanovo"),
    ("s9613487", "Matveyev Kurgan"),
    ("s9613488", "Kuybyshevo"),
    ("s9613489", "Sinyavka"),
    ("s9613490", "Chaltyr"),
    ("s9613491", "Bolshiye Saly"),
    ("s9613492", "Bataysk"),
    ("s9613493", "Azov"),
    ("s9613255", "Bessergenovka"),
    ("s9613383", "1283 km"),
    // Southern Russia
    ("s9607404", "Krasnodar"),
    ("s9623547", "Anapa"),
    ("s9607398", "Sochi"),
    ("s9635385", "Adler"),
    ("s9635145", "Novorossiysk"),
    ("s9620770", "Volgograd"),
    ("s9635134", "Tuapse"),
    // Moscow
    ("s2000002", "Moscow (Kursky)"),
    ("s2000006", "Moscow (Kazansky)"),
    ("s2000003", "Moscow (Yaroslavsky)"),
    ("s2000004", "Moscow (Leningradsky)"),
    ("s2000005", "Moscow (Paveletsky)"),
    ("s2000001", "Moscow (Kievsky)"),
    ("s2000007", "Moscow (Belorussky)"),
    // Saint Petersburg
    ("s2004001", "Saint Petersburg (Moskovsky)"),
    ("s2004006", "Saint Petersburg (Vitebsky)"),
    ("s2004003", "Saint Petersburg (Ladozhsky)"),
    ("s2004004", "Saint Petersburg (Finlyandsky)"),
    // Volga
    ("s9610171", "Kazan"),
    ("s9623443", "Nizhny Novgorod"),
    ("s9608105", "Samara"),
    ("s9623290", "Saratov"),
    ("s9623214", "Ufa"),
    ("s9608191", "Perm"),
    // Urals
    ("s9607693", "Yekaterinburg"),
    ("s9607795", "Chelyabinsk"),
    ("s9623371", "Tyumen"),
    // Siberia and the Far East
    ("s9607120", "Novosibirsk"),
    ("s9607077", "Omsk"),
    ("s9623307", "Krasnoyarsk"),
    ("s9635387", "Irkutsk"),
    ("s9635427", "Vladivostok"),
    ("s9635386", "Khabarovsk"),
    // Central Russia
    ("s9612893", "Voronezh"),
    ("s9613016", "Belgorod"),
    ("s9607881", "Tula"),
    ("s9623147", "Ryazan"),
    ("s9623210", "Tambov"),
    ("s9623352", "Lipetsk"),
    ("s9623254", "Kursk"),
    ("s9623269", "Oryol"),
    // North Caucasus
    ("s9635342", "Mineralnye Vody"),
    ("s9635329", "Pyatigorsk"),
    ("s9635331", "Kislovodsk"),
    ("s9635324", "Yessentuki"),
    ("s9635373", "Grozny"),
    ("s9635346", "Makhachkala"),
    // Northwest
    ("s9623204", "Murmansk"),
    ("s9623278", "Petrozavodsk"),
    ("s9623421", "Pskov"),
    ("s9623434", "Veliky Novgorod"),
    ("s9623362", "Arkhangelsk"),
];
